//! The working stream's unit of data, grounded on
//! `original_source/Lib/compositor/glyphRecord.py`'s `GlyphRecord`.

use crate::cmap::ReverseCmap;
use crate::value::ValueRecord;

/// A single identity recorded in a [`GlyphRecord`]'s substitution history: either
/// a simple substitution (one prior name) or a ligature substitution (the
/// components that were consumed to produce the current name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Single(String),
    Ligature(Vec<String>),
}

/// The unit of the working glyph stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRecord {
    pub glyph_name: String,
    pub x_placement: i32,
    pub y_placement: i32,
    pub x_advance: i32,
    pub y_advance: i32,
    /// Set after GSUB by the caller, from font metrics.
    pub advance_width: i32,
    pub advance_height: i32,
    /// Ordered list of glyph names, for `aalt` and `rand` discovery.
    pub alternates: Vec<String>,
    /// The glyph name under which `alternates` was accumulated. Cleared
    /// whenever the head glyph identity changes.
    pub alternates_reference: Option<String>,
    /// Recorded when this record represents a ligature.
    pub ligature_components: Vec<String>,
    /// Append-only stack of prior identities, most-recently-pushed last.
    pub substitution_history: Vec<HistoryEntry>,
}

impl GlyphRecord {
    pub fn new(glyph_name: impl Into<String>) -> GlyphRecord {
        GlyphRecord {
            glyph_name: glyph_name.into(),
            x_placement: 0,
            y_placement: 0,
            x_advance: 0,
            y_advance: 0,
            advance_width: 0,
            advance_height: 0,
            alternates: Vec::new(),
            alternates_reference: None,
            ligature_components: Vec::new(),
            substitution_history: Vec::new(),
        }
    }

    pub fn value_record(&self) -> ValueRecord {
        ValueRecord::new(
            self.x_placement,
            self.y_placement,
            self.x_advance,
            self.y_advance,
        )
    }

    pub fn apply_value_record(&mut self, value: ValueRecord) {
        self.x_placement += value.x_placement;
        self.y_placement += value.y_placement;
        self.x_advance += value.x_advance;
        self.y_advance += value.y_advance;
    }

    /// Records the current identity in the history, then overwrites it. Used
    /// by single-substitution and the `rand` alternate-set path.
    pub fn substitute(&mut self, new_name: impl Into<String>) {
        self.substitution_history
            .push(HistoryEntry::Single(self.glyph_name.clone()));
        self.glyph_name = new_name.into();
    }

    /// Rewrites this record's identity as the result of a ligature match,
    /// without pushing a fresh `alternates_reference` discipline decision (the
    /// caller does that, since it varies per feature tag).
    pub fn substitute_ligature(&mut self, new_name: impl Into<String>, components: Vec<String>) {
        self.substitution_history
            .push(HistoryEntry::Ligature(components.clone()));
        self.ligature_components = components;
        self.glyph_name = new_name.into();
    }

    /// Appends to `alternates`, resetting the list first if the record's
    /// identity has changed since the list was last populated (the
    /// `alternates_reference` invariant).
    pub fn push_alternate(&mut self, alternate: impl Into<String>) {
        if self.alternates_reference.as_deref() != Some(self.glyph_name.as_str()) {
            self.alternates.clear();
            self.alternates_reference = Some(self.glyph_name.clone());
        }
        self.alternates.push(alternate.into());
    }

    /// Replaces `alternates` wholesale (GSUB type 3's `AlternateSet`
    /// publication), with the same reference-reset discipline as `aalt`.
    pub fn set_alternates(&mut self, alternates: Vec<String>) {
        self.alternates_reference = Some(self.glyph_name.clone());
        self.alternates = alternates;
    }

    /// The earliest glyph name in the substitution history (searched
    /// most-recent-first) that the reverse cmap maps to a Unicode value,
    /// falling back to the current identity. Ligature history entries
    /// contribute their *first* component on this side.
    pub fn side1_glyph_name_with_unicode_value(&self, reverse_cmap: &ReverseCmap) -> String {
        self.side_glyph_name_with_unicode_value(reverse_cmap, true)
    }

    /// As [`GlyphRecord::side1_glyph_name_with_unicode_value`], but ligature
    /// history entries contribute their *last* component.
    pub fn side2_glyph_name_with_unicode_value(&self, reverse_cmap: &ReverseCmap) -> String {
        self.side_glyph_name_with_unicode_value(reverse_cmap, false)
    }

    fn side_glyph_name_with_unicode_value(&self, reverse_cmap: &ReverseCmap, side1: bool) -> String {
        if reverse_cmap.unicode_for_glyph(&self.glyph_name).is_some() {
            return self.glyph_name.clone();
        }
        for entry in self.substitution_history.iter().rev() {
            let candidate = match entry {
                HistoryEntry::Single(name) => name.clone(),
                HistoryEntry::Ligature(components) => {
                    if side1 {
                        components.first().cloned()
                    } else {
                        components.last().cloned()
                    }
                    .unwrap_or_else(|| self.glyph_name.clone())
                }
            };
            if reverse_cmap.unicode_for_glyph(&candidate).is_some() {
                return candidate;
            }
        }
        self.glyph_name.clone()
    }
}

/// Builds fresh, unpositioned glyph records from a sequence of glyph names —
/// the synthesis step used by GSUB type 2 (multiple substitution) and as the
/// entry point for pre-formed glyph-name input.
pub fn glyph_names_to_glyph_records(names: &[String]) -> Vec<GlyphRecord> {
    names.iter().map(GlyphRecord::new).collect()
}

pub fn glyph_records_to_glyph_names(records: &[GlyphRecord]) -> Vec<String> {
    records.iter().map(|r| r.glyph_name.clone()).collect()
}

/// `(advance_x, advance_y, x_placement, y_placement)` tuples, mirroring the
/// original's `glyphRecordsToTuples` used by consumers that only need the
/// positioning output.
pub fn glyph_records_to_tuples(records: &[GlyphRecord]) -> Vec<(i32, i32, i32, i32)> {
    records
        .iter()
        .map(|r| (r.x_advance, r.y_advance, r.x_placement, r.y_placement))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cmap_with(pairs: &[(char, &str)]) -> ReverseCmap {
        let mut forward = HashMap::new();
        for (ch, name) in pairs {
            forward.insert(*ch, name.to_string());
        }
        crate::cmap::Cmap::new(forward).reverse()
    }

    #[test]
    fn substitute_pushes_history_and_renames() {
        let mut rec = GlyphRecord::new("a");
        rec.substitute("a.sc");
        assert_eq!(rec.glyph_name, "a.sc");
        assert_eq!(
            rec.substitution_history,
            vec![HistoryEntry::Single("a".into())]
        );
    }

    #[test]
    fn push_alternate_resets_on_identity_change() {
        let mut rec = GlyphRecord::new("a");
        rec.push_alternate("a.alt1");
        rec.push_alternate("a.alt2");
        assert_eq!(rec.alternates, vec!["a.alt1", "a.alt2"]);

        rec.glyph_name = "b".into();
        rec.push_alternate("b.alt1");
        assert_eq!(rec.alternates, vec!["b.alt1"]);
    }

    #[test]
    fn side_names_fall_back_through_ligature_history() {
        let reverse = cmap_with(&[('f', "f"), ('i', "i")]);
        let mut rec = GlyphRecord::new("f");
        rec.substitute_ligature("fi", vec!["f".to_string(), "i".to_string()]);
        rec.substitute("fi.alt");

        assert_eq!(rec.side1_glyph_name_with_unicode_value(&reverse), "f");
        assert_eq!(rec.side2_glyph_name_with_unicode_value(&reverse), "i");
    }
}
