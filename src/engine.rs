//! Font-level convenience layer, grounded on
//! `original_source/Lib/compositor/layoutEngine.py` (`LayoutEngine`) and
//! `original_source/Lib/compositor/__init__.py` (`Font`). Composes the
//! lower-level table/context/stream-processor pieces already built — `Table`,
//! `GsubContext`/`GposContext`, `table::process_lookups`, `unicode::convert_case`
//! — into the two public entry points this module exposes: `LayoutEngine`
//! and `Font`.

use std::collections::BTreeSet;

use crate::cmap::{Cmap, ReverseCmap};
use crate::error::{LayoutError, Result};
use crate::gdef::Gdef;
use crate::glyph_record::{glyph_names_to_glyph_records, GlyphRecord};
use crate::gpos::{self, GposContext};
use crate::gsub::{self, GsubContext};
use crate::logger::{Logger, NullLogger};
use crate::lookup::Lookup;
use crate::random::{RandomSource, ThreadRandomSource};
use crate::table::{process_lookups, Table};
use crate::tag::{self, Tag};
use crate::unicode::{self, Case};

/// Either Unicode text (mapped through the engine's `Cmap`) or a pre-formed
/// glyph-name sequence, the two forms `process()` accepts as input.
pub enum Input<'a> {
    Text(&'a str),
    GlyphNames(&'a [String]),
}

/// The configuration knobs of `process()` besides the input itself.
/// `script` defaults to `latn`, everything else to its off state.
pub struct ProcessOptions<'a> {
    pub script: Tag,
    pub lang_sys: Option<Tag>,
    pub right_to_left: bool,
    pub case: Option<Case>,
    /// Language tag consulted by language-specific special casing (e.g. `"tr"`).
    pub language: Option<&'a str>,
    /// Glyph name substituted for an unmapped input code point. `None`
    /// suppresses the record entirely.
    pub fallback_glyph: Option<&'a str>,
}

impl<'a> Default for ProcessOptions<'a> {
    fn default() -> ProcessOptions<'a> {
        ProcessOptions {
            script: tag::LATN,
            lang_sys: None,
            right_to_left: false,
            case: None,
            language: None,
            fallback_glyph: Some(".notdef"),
        }
    }
}

/// The thin orchestrator of the whole pipeline, mirroring
/// `layoutEngine.py`'s `LayoutEngine`: a `Cmap`, an optional
/// `Gdef`, and optional GSUB/GPOS tables, with no glyph-order or metrics
/// bookkeeping of its own (that's `Font`, below).
pub struct LayoutEngine {
    pub cmap: Cmap,
    reverse_cmap: ReverseCmap,
    pub gdef: Option<Gdef>,
    pub gsub: Option<Table<gsub::Subtable>>,
    pub gpos: Option<Table<gpos::Subtable>>,
}

impl LayoutEngine {
    pub fn new(
        cmap: Cmap,
        gdef: Option<Gdef>,
        gsub: Option<Table<gsub::Subtable>>,
        gpos: Option<Table<gpos::Subtable>>,
    ) -> LayoutEngine {
        let reverse_cmap = cmap.reverse();
        LayoutEngine {
            cmap,
            reverse_cmap,
            gdef,
            gsub,
            gpos,
        }
    }

    pub fn reverse_cmap(&self) -> &ReverseCmap {
        &self.reverse_cmap
    }

    /// Runs the full prepare → GSUB → GPOS pipeline. `rand` feeds GSUB type
    /// 3's `rand` feature; pass a [`crate::random::FixedRandomSource`] in
    /// tests that need a fixed seed.
    pub fn process(
        &self,
        input: Input,
        options: &ProcessOptions,
        rand: &mut dyn RandomSource,
        logger: &mut dyn Logger,
    ) -> Result<Vec<GlyphRecord>> {
        logger.log_start();
        let mut records = self.prepare(input, options, logger)?;

        if let Some(gsub) = &self.gsub {
            records = self.run_gsub(gsub, records, options, rand, logger);
        }
        if let Some(gpos) = &self.gpos {
            records = self.run_gpos(gpos, records, options, logger);
        }

        logger.log_results(&records);
        logger.log_end();
        Ok(records)
    }

    /// The input-mapping/case-conversion/reversal prologue shared by
    /// `process` and [`Font::process_with`] (which needs to inject advance
    /// widths between the GSUB and GPOS stages rather than run them back to
    /// back). Does not call `log_start`/`log_end`/`log_results` — the caller
    /// owns those, since `Font` brackets both stages as a single report.
    pub(crate) fn prepare(&self, input: Input, options: &ProcessOptions, logger: &mut dyn Logger) -> Result<Vec<GlyphRecord>> {
        let mut glyph_names = match input {
            Input::Text(text) => {
                let mut names = Vec::with_capacity(text.chars().count());
                for ch in text.chars() {
                    match self.cmap.glyph_for_char(ch) {
                        Some(name) => names.push(name.to_string()),
                        None => {
                            if let Some(fallback) = options.fallback_glyph {
                                names.push(fallback.to_string());
                            }
                        }
                    }
                }
                names
            }
            Input::GlyphNames(names) => names.to_vec(),
        };

        logger.log_main_settings(&glyph_names, options.script, options.lang_sys);

        if let Some(case) = options.case {
            glyph_names = unicode::convert_case(
                case,
                &glyph_names,
                &self.cmap,
                &self.reverse_cmap,
                options.language,
                options.fallback_glyph.unwrap_or(".notdef"),
            )?;
        }

        if options.right_to_left {
            glyph_names.reverse();
        }

        Ok(glyph_names_to_glyph_records(&glyph_names))
    }

    pub(crate) fn run_gsub(
        &self,
        table: &Table<gsub::Subtable>,
        records: Vec<GlyphRecord>,
        options: &ProcessOptions,
        rand: &mut dyn RandomSource,
        logger: &mut dyn Logger,
    ) -> Vec<GlyphRecord> {
        logger.log_table_start("GSUB", &self.feature_states(table));
        let applicable = table.get_applicable_features(options.script, options.lang_sys);
        logger.log_applicable_lookups(&applicable);
        logger.log_processing_start();

        let gdef = self.gdef.as_ref();
        let reverse_cmap = &self.reverse_cmap;
        let lookups = &table.lookups;
        let result = {
            let mut run_lookup = |lookup_index: usize,
                                   feature_tag: Tag,
                                   processed: &mut Vec<GlyphRecord>,
                                   remaining: &mut Vec<GlyphRecord>|
             -> bool {
                run_gsub_lookup(lookups, gdef, &mut *rand, &mut *logger, lookup_index, feature_tag, processed, remaining)
            };
            process_lookups(records, &applicable, reverse_cmap, &mut run_lookup)
        };

        logger.log_processing_end();
        logger.log_table_end();
        result
    }

    pub(crate) fn run_gpos(
        &self,
        table: &Table<gpos::Subtable>,
        records: Vec<GlyphRecord>,
        options: &ProcessOptions,
        logger: &mut dyn Logger,
    ) -> Vec<GlyphRecord> {
        logger.log_table_start("GPOS", &self.feature_states(table));
        let applicable = table.get_applicable_features(options.script, options.lang_sys);
        logger.log_applicable_lookups(&applicable);
        logger.log_processing_start();

        let gdef = self.gdef.as_ref();
        let reverse_cmap = &self.reverse_cmap;
        let lookups = &table.lookups;
        let result = {
            let mut run_lookup = |lookup_index: usize,
                                   feature_tag: Tag,
                                   processed: &mut Vec<GlyphRecord>,
                                   remaining: &mut Vec<GlyphRecord>|
             -> bool {
                run_gpos_lookup(lookups, gdef, &mut *logger, lookup_index, feature_tag, processed, remaining)
            };
            process_lookups(records, &applicable, reverse_cmap, &mut run_lookup)
        };

        logger.log_processing_end();
        logger.log_table_end();
        result
    }

    fn feature_states<T>(&self, table: &Table<T>) -> Vec<(Tag, bool)> {
        table
            .feature_tags()
            .into_iter()
            .map(|tag| (tag, table.get_feature_state(tag).unwrap_or(false)))
            .collect()
    }

    /// Sorted union of GSUB's and GPOS's script tags.
    pub fn get_script_list(&self) -> Vec<Tag> {
        let mut tags: BTreeSet<Tag> = BTreeSet::new();
        if let Some(gsub) = &self.gsub {
            tags.extend(gsub.script_list.scripts.keys().copied());
        }
        if let Some(gpos) = &self.gpos {
            tags.extend(gpos.script_list.scripts.keys().copied());
        }
        tags.into_iter().collect()
    }

    /// Sorted union of every named `LangSys` tag across every script of both
    /// tables.
    pub fn get_language_list(&self) -> Vec<Tag> {
        let mut tags: BTreeSet<Tag> = BTreeSet::new();
        if let Some(gsub) = &self.gsub {
            for script in gsub.script_list.scripts.values() {
                tags.extend(script.lang_sys_records.keys().copied());
            }
        }
        if let Some(gpos) = &self.gpos {
            for script in gpos.script_list.scripts.values() {
                tags.extend(script.lang_sys_records.keys().copied());
            }
        }
        tags.into_iter().collect()
    }

    /// Sorted union of GSUB's and GPOS's feature tags.
    pub fn get_feature_list(&self) -> Vec<Tag> {
        let mut tags: BTreeSet<Tag> = BTreeSet::new();
        if let Some(gsub) = &self.gsub {
            tags.extend(gsub.feature_tags());
        }
        if let Some(gpos) = &self.gpos {
            tags.extend(gpos.feature_tags());
        }
        tags.into_iter().collect()
    }

    /// `Err(FeatureStateInconsistent)` if GSUB and GPOS disagree;
    /// `Err(FeatureAbsent)` if neither table declares `tag`.
    pub fn get_feature_state(&self, tag: Tag) -> Result<bool> {
        let gsub_state = self.gsub.as_ref().and_then(|t| t.get_feature_state(tag));
        let gpos_state = self.gpos.as_ref().and_then(|t| t.get_feature_state(tag));
        match (gsub_state, gpos_state) {
            (Some(a), Some(b)) if a != b => {
                log::warn!("feature {} has inconsistent state between GSUB ({}) and GPOS ({})", tag, a, b);
                Err(LayoutError::FeatureStateInconsistent(tag))
            }
            (Some(a), _) => Ok(a),
            (None, Some(b)) => Ok(b),
            (None, None) => {
                log::debug!("feature {} requested but present in neither table", tag);
                Err(LayoutError::FeatureAbsent(tag))
            }
        }
    }

    /// Applies to whichever of GSUB/GPOS declare `tag`; a no-op in a table
    /// that doesn't.
    pub fn set_feature_state(&self, tag: Tag, enabled: bool) {
        if let Some(gsub) = &self.gsub {
            gsub.set_feature_state(tag, enabled);
        }
        if let Some(gpos) = &self.gpos {
            gpos.set_feature_state(tag, enabled);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_gsub_lookup(
    lookups: &[Lookup<gsub::Subtable>],
    gdef: Option<&Gdef>,
    rand: &mut dyn RandomSource,
    logger: &mut dyn Logger,
    lookup_index: usize,
    feature_tag: Tag,
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
) -> bool {
    let lookup = match lookups.get(lookup_index) {
        Some(lookup) => lookup,
        None => {
            log::warn!("feature {} referenced out-of-range GSUB lookup {}", feature_tag, lookup_index);
            return false;
        }
    };
    logger.log_lookup_start(feature_tag, lookup_index);
    logger.log_input(processed, remaining);

    let mut ctx = GsubContext {
        flag: lookup.flag,
        lookups,
        gdef,
        rand,
    };
    let mut acted = false;
    for (index, subtable) in lookup.subtables.iter().enumerate() {
        logger.log_subtable_start(index, subtable.type_name());
        if subtable.process(processed, remaining, feature_tag, &mut ctx) {
            logger.log_subtable_end();
            acted = true;
            break;
        }
        logger.log_subtable_end();
    }

    logger.log_output(processed, remaining);
    logger.log_lookup_end();
    acted
}

fn run_gpos_lookup(
    lookups: &[Lookup<gpos::Subtable>],
    gdef: Option<&Gdef>,
    logger: &mut dyn Logger,
    lookup_index: usize,
    feature_tag: Tag,
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
) -> bool {
    let lookup = match lookups.get(lookup_index) {
        Some(lookup) => lookup,
        None => {
            log::warn!("feature {} referenced out-of-range GPOS lookup {}", feature_tag, lookup_index);
            return false;
        }
    };
    logger.log_lookup_start(feature_tag, lookup_index);
    logger.log_input(processed, remaining);

    let mut ctx = GposContext {
        flag: lookup.flag,
        lookups,
        gdef,
    };
    let mut acted = false;
    for (index, subtable) in lookup.subtables.iter().enumerate() {
        logger.log_subtable_start(index, subtable.type_name());
        if subtable.process(processed, remaining, feature_tag, &mut ctx) {
            logger.log_subtable_end();
            acted = true;
            break;
        }
        logger.log_subtable_end();
    }

    logger.log_output(processed, remaining);
    logger.log_lookup_end();
    acted
}

/// Composes a [`LayoutEngine`] with glyph-order/metrics lookups, mirroring
/// `__init__.py`'s top-level `Font` class. `Font` adds nothing
/// fallible of its own: advance-width injection is a plain lookup, and
/// `process` simply delegates, then adds each record's caller-supplied
/// advance width/height on top of whatever GSUB/GPOS left behind.
pub struct Font {
    pub engine: LayoutEngine,
    /// Per-glyph `(advance_width, advance_height)`, applied to every record
    /// after GSUB (font-metric advance widths... added onto
    /// records after GSUB).
    advances: std::collections::HashMap<String, (i32, i32)>,
}

impl Font {
    pub fn new(engine: LayoutEngine, advances: std::collections::HashMap<String, (i32, i32)>) -> Font {
        Font { engine, advances }
    }

    pub fn advance_for(&self, glyph_name: &str) -> (i32, i32) {
        self.advances.get(glyph_name).copied().unwrap_or((0, 0))
    }

    /// As [`LayoutEngine::process`], but with a default [`ThreadRandomSource`]
    /// and [`NullLogger`], and with advance widths injected from this font's
    /// metrics immediately after GSUB and before GPOS runs.
    pub fn process(&self, input: Input, options: &ProcessOptions) -> Result<Vec<GlyphRecord>> {
        let mut rand = ThreadRandomSource::new();
        let mut logger = NullLogger;
        self.process_with(input, options, &mut rand, &mut logger)
    }

    /// As [`Font::process`], with caller-supplied randomness and logging.
    /// GSUB and GPOS need advance widths set between them, so this can't
    /// simply delegate to [`LayoutEngine::process`] end to end: it replays
    /// that method's own prologue/GSUB/GPOS sequencing by hand, injecting
    /// advances in between.
    pub fn process_with(
        &self,
        input: Input,
        options: &ProcessOptions,
        rand: &mut dyn RandomSource,
        logger: &mut dyn Logger,
    ) -> Result<Vec<GlyphRecord>> {
        logger.log_start();
        let mut records = self.engine.prepare(input, options, logger)?;

        if let Some(gsub) = &self.engine.gsub {
            records = self.engine.run_gsub(gsub, records, options, rand, logger);
        }

        for record in &mut records {
            let (width, height) = self.advance_for(&record.glyph_name);
            record.advance_width = width;
            record.advance_height = height;
        }

        if let Some(gpos) = &self.engine.gpos {
            records = self.engine.run_gpos(gpos, records, options, logger);
        }

        logger.log_results(&records);
        logger.log_end();
        Ok(records)
    }
}
