//! Processing log, grounded on
//! `original_source/Lib/compositor/logger.py`'s `Logger`, which emits an XML
//! report of a font's table/lookup/subtable structure as text is processed.
//! `Logger` is the trait every engine entry point calls into (kept separate
//! from [`crate::table::Table`] so a caller can swap in a no-op or a
//! test-collecting implementation); [`XmlLogger`] is the concrete XML-writing
//! implementation, built on the `xmlwriter` crate the way the original builds
//! on `fontTools`' `XMLWriter`.

use xmlwriter::{Options, XmlWriter};

use crate::glyph_record::GlyphRecord;
use crate::tag::Tag;

/// The full set of logging call sites `tables.py`'s `_processLookups`/
/// `_processLookup` (and their `Font`/`LayoutEngine` callers) make.
pub trait Logger {
    fn log_start(&mut self) {}
    fn log_end(&mut self) {}
    fn log_main_settings(&mut self, _glyph_names: &[String], _script: Tag, _lang_sys: Option<Tag>) {}
    /// `table_name` is the table's own name ("GSUB"/"GPOS"); `feature_states`
    /// need not be pre-sorted — `XmlLogger` sorts by tag itself, mirroring
    /// the original's `sorted(table.getFeatureList())`.
    fn log_table_start(&mut self, _table_name: &str, _feature_states: &[(Tag, bool)]) {}
    fn log_table_end(&mut self) {}
    /// `lookups` is in the exact order `Table::get_applicable_features`
    /// returned it: `(featureTag, lookupIndex)` pairs.
    fn log_applicable_lookups(&mut self, _lookups: &[(Tag, usize)]) {}
    fn log_processing_start(&mut self) {}
    fn log_processing_end(&mut self) {}
    fn log_lookup_start(&mut self, _feature_tag: Tag, _lookup_index: usize) {}
    fn log_lookup_end(&mut self) {}
    fn log_subtable_start(&mut self, _subtable_index: usize, _subtable_type: &str) {}
    fn log_subtable_end(&mut self) {}
    fn log_input(&mut self, _processed: &[GlyphRecord], _unprocessed: &[GlyphRecord]) {}
    fn log_output(&mut self, _processed: &[GlyphRecord], _unprocessed: &[GlyphRecord]) {}
    fn log_results(&mut self, _processed: &[GlyphRecord]) {}
}

/// A [`Logger`] that discards everything; the default when a caller has no
/// use for a report. Logging is opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {}

/// Builds the same XML report shape as `logger.py`, via the `xmlwriter` crate.
pub struct XmlLogger {
    writer: XmlWriter,
}

impl XmlLogger {
    pub fn new() -> XmlLogger {
        XmlLogger {
            writer: XmlWriter::new(Options::default()),
        }
    }

    /// Consumes the logger, returning the finished XML report
    /// (`logger.py`'s `getText`).
    pub fn into_inner(self) -> String {
        self.writer.end_document()
    }

    fn log_glyph_records(&mut self, records: &[GlyphRecord]) {
        for record in records {
            self.writer.start_element("glyphRecord");
            self.writer.write_attribute("name", &record.glyph_name);
            self.writer.write_attribute("xPlacement", &record.x_placement);
            self.writer.write_attribute("yPlacement", &record.y_placement);
            self.writer.write_attribute("xAdvance", &record.x_advance);
            self.writer.write_attribute("yAdvance", &record.y_advance);
            self.writer.end_element();
        }
    }
}

impl Default for XmlLogger {
    fn default() -> XmlLogger {
        XmlLogger::new()
    }
}

impl Logger for XmlLogger {
    fn log_start(&mut self) {
        self.writer.start_element("xml");
    }

    fn log_end(&mut self) {
        self.writer.end_element();
    }

    fn log_main_settings(&mut self, glyph_names: &[String], script: Tag, lang_sys: Option<Tag>) {
        self.writer.start_element("initialSettings");
        self.writer.start_element("string");
        self.writer.write_attribute("value", &glyph_names.join(" "));
        self.writer.end_element();
        self.writer.start_element("script");
        self.writer.write_attribute("value", &script.as_str());
        self.writer.end_element();
        self.writer.start_element("langSys");
        self.writer
            .write_attribute("value", &lang_sys.map(|t| t.as_str()).unwrap_or_default());
        self.writer.end_element();
        self.writer.end_element();
    }

    fn log_table_start(&mut self, table_name: &str, feature_states: &[(Tag, bool)]) {
        self.writer.start_element("table");
        self.writer.write_attribute("name", &table_name);
        self.writer.start_element("featureStates");
        let mut sorted_states: Vec<&(Tag, bool)> = feature_states.iter().collect();
        sorted_states.sort_by_key(|(tag, _)| *tag);
        for (tag, state) in sorted_states {
            self.writer.start_element("feature");
            self.writer.write_attribute("name", &tag.as_str());
            self.writer.write_attribute("state", &(*state as u8));
            self.writer.end_element();
        }
        self.writer.end_element();
    }

    fn log_table_end(&mut self) {
        self.writer.end_element();
    }

    fn log_applicable_lookups(&mut self, lookups: &[(Tag, usize)]) {
        self.writer.start_element("applicableLookups");
        let mut run_tag: Option<Tag> = None;
        let mut run: Vec<usize> = Vec::new();
        for &(tag, index) in lookups {
            if run_tag != Some(tag) {
                if let Some(previous_tag) = run_tag {
                    self.write_lookup_run(previous_tag, &run);
                }
                run.clear();
                run_tag = Some(tag);
            }
            run.push(index);
        }
        if let Some(tag) = run_tag {
            self.write_lookup_run(tag, &run);
        }
        self.writer.end_element();
    }

    fn log_processing_start(&mut self) {
        self.writer.start_element("processing");
    }

    fn log_processing_end(&mut self) {
        self.writer.end_element();
    }

    fn log_lookup_start(&mut self, feature_tag: Tag, lookup_index: usize) {
        self.writer.start_element("lookup");
        self.writer.write_attribute("feature", &feature_tag.as_str());
        self.writer.write_attribute("index", &lookup_index);
    }

    fn log_lookup_end(&mut self) {
        self.writer.end_element();
    }

    fn log_subtable_start(&mut self, subtable_index: usize, subtable_type: &str) {
        self.writer.start_element("subTable");
        self.writer.write_attribute("index", &subtable_index);
        self.writer.write_attribute("type", &subtable_type);
    }

    fn log_subtable_end(&mut self) {
        self.writer.end_element();
    }

    fn log_input(&mut self, processed: &[GlyphRecord], unprocessed: &[GlyphRecord]) {
        self.writer.start_element("input");
        self.writer.start_element("processed");
        self.log_glyph_records(processed);
        self.writer.end_element();
        self.writer.start_element("unprocessed");
        self.log_glyph_records(unprocessed);
        self.writer.end_element();
        self.writer.end_element();
    }

    fn log_output(&mut self, processed: &[GlyphRecord], unprocessed: &[GlyphRecord]) {
        self.writer.start_element("output");
        self.writer.start_element("processed");
        self.log_glyph_records(processed);
        self.writer.end_element();
        self.writer.start_element("unprocessed");
        self.log_glyph_records(unprocessed);
        self.writer.end_element();
        self.writer.end_element();
    }

    fn log_results(&mut self, processed: &[GlyphRecord]) {
        self.writer.start_element("results");
        self.log_glyph_records(processed);
        self.writer.end_element();
    }
}

impl XmlLogger {
    fn write_lookup_run(&mut self, tag: Tag, indices: &[usize]) {
        let joined = indices.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        self.writer.start_element("lookups");
        self.writer.write_attribute("feature", &tag.as_str());
        self.writer.write_attribute("indices", &joined);
        self.writer.end_element();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_report_is_well_formed_nesting() {
        let mut logger = XmlLogger::new();
        logger.log_start();
        logger.log_main_settings(&["a".to_string(), "b".to_string()], crate::tag!(b"latn"), None);
        logger.log_end();
        let xml = logger.into_inner();
        assert!(xml.contains("initialSettings"));
        assert!(xml.contains("latn"));
    }

    #[test]
    fn applicable_lookups_groups_consecutive_same_tag_runs() {
        let mut logger = XmlLogger::new();
        logger.log_applicable_lookups(&[
            (crate::tag!(b"liga"), 0),
            (crate::tag!(b"liga"), 2),
            (crate::tag!(b"calt"), 1),
        ]);
        let xml = logger.into_inner();
        assert!(xml.contains(r#"indices="0 2""#));
        assert!(xml.contains(r#"indices="1""#));
    }
}
