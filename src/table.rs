//! The GSUB/GPOS table shell and the lookup-application stream processor,
//! grounded on `original_source/Lib/compositor/tables.py`'s `BaseTable` class
//! (`_preprocess`/`_getApplicableFeatures`/`_getFeatures`/`_processLookups`/
//! `_processLookup`). `Table<T>` is deliberately free of GSUB/GPOS-specific
//! subtable dispatch — `T` is just the subtable variant type stored per
//! lookup (`gsub::Subtable` or `gpos::Subtable`) — so that dispatch logic
//! stays where the rest of each table's behavior already lives. The actual
//! per-lookup subtable walk is supplied by the caller as a closure, following
//! an arena-and-index strategy generalized across both tables: subtables
//! hold integer indices rather than back-references, and receive a borrowed
//! reference to the owning table's lookups when invoked.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::cmap::ReverseCmap;
use crate::feature::{is_boundary_sensitive, AALT};
use crate::feature::{Feature, FeatureList};
use crate::glyph_record::GlyphRecord;
use crate::lookup::Lookup;
use crate::script::ScriptList;
use crate::tag::{self, Tag};

/// Table data shared by GSUB and GPOS: script/feature registries, the
/// lookup list itself, per-tag on/off state, and a cache of
/// resolved `(script, lang_sys) -> applicable lookups` answers. Deliberately
/// `!Sync`: the cache is a plain `RefCell`, not a `Mutex`, since a table is
/// owned and mutated by one caller at a time.
#[derive(Debug)]
pub struct Table<T> {
    pub script_list: ScriptList,
    pub feature_list: FeatureList,
    pub lookups: Vec<Lookup<T>>,
    feature_state: RefCell<HashMap<Tag, bool>>,
    applicable_cache: RefCell<HashMap<(Tag, Option<Tag>), Vec<(Tag, usize)>>>,
}

impl<T> Table<T> {
    /// `default_on` is the table's closed default-on feature list (spec
    /// §4.6): `feature::GSUB_DEFAULT_ON`/`GPOS_DEFAULT_ON`, already converted
    /// to `Tag`s by `feature::default_on_tags`.
    pub fn new(script_list: ScriptList, feature_list: FeatureList, lookups: Vec<Lookup<T>>, default_on: &[Tag]) -> Table<T> {
        let mut state = HashMap::new();
        for feature in &feature_list.features {
            state.insert(feature.tag, default_on.contains(&feature.tag));
        }
        Table {
            script_list,
            feature_list,
            lookups,
            feature_state: RefCell::new(state),
            applicable_cache: RefCell::new(HashMap::new()),
        }
    }

    /// `None` if `tag` names no feature in this table's `FeatureList`.
    pub fn get_feature_state(&self, tag: Tag) -> Option<bool> {
        self.feature_state.borrow().get(&tag).copied()
    }

    /// No-op if `tag` names no feature in this table's `FeatureList`.
    /// Invalidates the applicable-feature cache, since a state flip can
    /// change which lookups are returned for any `(script, lang_sys)`.
    pub fn set_feature_state(&self, tag: Tag, enabled: bool) {
        let mut state = self.feature_state.borrow_mut();
        if let Some(slot) = state.get_mut(&tag) {
            *slot = enabled;
            self.applicable_cache.borrow_mut().clear();
        }
    }

    pub fn contains_feature(&self, tag: Tag) -> bool {
        self.feature_state.borrow().contains_key(&tag)
    }

    pub fn feature_tags(&self) -> Vec<Tag> {
        self.feature_list.features.iter().map(|f| f.tag).collect()
    }

    /// `(featureTag, lookupIndex)` pairs in the exact order `_processLookups`
    /// must see them: ascending `lookupIndex`, ties broken by `featureTag`'s
    /// own ordering — `tables.py`'s `sorted(lookupIndexes)` sorts the literal
    /// `(lookupIndex, featureTag)` tuples, not insertion order (see
    /// DESIGN.md). Disabled features are excluded before the
    /// union/sort, not filtered after.
    pub fn get_applicable_features(&self, script: Tag, lang_sys: Option<Tag>) -> Vec<(Tag, usize)> {
        let key = (script, lang_sys);
        if let Some(cached) = self.applicable_cache.borrow().get(&key) {
            log::trace!("applicable-feature cache hit for ({}, {:?})", script, lang_sys);
            return cached.clone();
        }

        let script_table = self
            .script_list
            .scripts
            .get(&script)
            .or_else(|| self.script_list.scripts.get(&tag::DFLT));
        if script_table.is_none() {
            log::warn!("script {} not found and no DFLT script present; no lookups applicable", script);
        } else if !self.script_list.scripts.contains_key(&script) {
            log::debug!("script {} not found; falling back to DFLT", script);
        }

        let mut indices: BTreeSet<u16> = BTreeSet::new();
        if let Some(script_table) = script_table {
            if let Some(default_lang_sys) = &script_table.default_lang_sys {
                indices.extend(default_lang_sys.feature_indices.iter().copied());
                if let Some(req) = default_lang_sys.required_feature_index {
                    if req != 0xFFFF {
                        indices.insert(req);
                    }
                }
            }
            if !script_table.lang_sys_records.is_empty() {
                if let Some(named_tag) = lang_sys {
                    if let Some(named) = script_table.lang_sys_records.get(&named_tag) {
                        indices.extend(named.feature_indices.iter().copied());
                        if let Some(req) = named.required_feature_index {
                            if req != 0xFFFF {
                                indices.insert(req);
                            }
                        }
                    }
                }
            }
        }

        // `_getFeatures`: ascending FeatureIndex order.
        let features: Vec<&Feature> = indices.into_iter().filter_map(|index| self.feature_list.get(index)).collect();

        let mut lookup_pairs: Vec<(usize, Tag)> = Vec::new();
        let state = self.feature_state.borrow();
        for feature in features {
            if !state.get(&feature.tag).copied().unwrap_or(false) {
                continue;
            }
            for &lookup_index in &feature.lookup_indices {
                lookup_pairs.push((lookup_index as usize, feature.tag));
            }
        }
        drop(state);

        lookup_pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let result: Vec<(Tag, usize)> = lookup_pairs.into_iter().map(|(index, tag)| (tag, index)).collect();

        self.applicable_cache.borrow_mut().insert(key, result.clone());
        result
    }
}

/// Runs `lookups` (in the order [`Table::get_applicable_features`] returns)
/// over `glyph_records`, grounded on `tables.py`'s `_processLookups`. Each
/// lookup gets its own full left-to-right walk of the stream, consuming one
/// glyph at a time into `processed` unless `run_lookup` claims one or more.
/// `aalt` lookups are held back and replayed, as a single extra pass, after
/// every other lookup has run: "all alternates" discovery must see the
/// fully-substituted stream. `run_lookup` is supplied by the
/// caller (`engine.rs`) bound to either a `GsubContext` or `GposContext`;
/// it returns whether it performed an action, mirroring `_processLookup`'s
/// `performedAction`.
pub fn process_lookups(
    glyph_records: Vec<GlyphRecord>,
    lookups: &[(Tag, usize)],
    reverse_cmap: &ReverseCmap,
    run_lookup: &mut dyn FnMut(usize, Tag, &mut Vec<GlyphRecord>, &mut Vec<GlyphRecord>) -> bool,
) -> Vec<GlyphRecord> {
    process_lookups_inner(glyph_records, lookups, reverse_cmap, run_lookup, false)
}

fn process_lookups_inner(
    mut glyph_records: Vec<GlyphRecord>,
    lookups: &[(Tag, usize)],
    reverse_cmap: &ReverseCmap,
    run_lookup: &mut dyn FnMut(usize, Tag, &mut Vec<GlyphRecord>, &mut Vec<GlyphRecord>) -> bool,
    processing_aalt: bool,
) -> Vec<GlyphRecord> {
    let init = Tag::from_bytes(b"init");
    let medi = Tag::from_bytes(b"medi");
    let fina = Tag::from_bytes(b"fina");
    let isol = Tag::from_bytes(b"isol");

    let mut aalt_holding: Vec<(Tag, usize)> = Vec::new();

    for &(feature_tag, lookup_index) in lookups {
        if !processing_aalt && feature_tag == AALT {
            aalt_holding.push((feature_tag, lookup_index));
            continue;
        }

        let mut processed: Vec<GlyphRecord> = Vec::with_capacity(glyph_records.len());
        let mut remaining = glyph_records;

        while !remaining.is_empty() {
            let mut skip = false;
            if is_boundary_sensitive(feature_tag) {
                let side1_names: Vec<String> = processed
                    .iter()
                    .chain(remaining.iter())
                    .map(|r| r.side1_glyph_name_with_unicode_value(reverse_cmap))
                    .collect();
                let side2_names: Vec<String> = processed
                    .iter()
                    .chain(remaining.iter())
                    .map(|r| r.side2_glyph_name_with_unicode_value(reverse_cmap))
                    .collect();
                let index = processed.len();
                let word_break_before = crate::unicode::is_word_break_before(&side1_names, index, reverse_cmap);
                let word_break_after = crate::unicode::is_word_break_after(&side2_names, index, reverse_cmap);

                skip = if feature_tag == init {
                    !word_break_before || word_break_after
                } else if feature_tag == medi {
                    word_break_before || word_break_after
                } else if feature_tag == fina {
                    word_break_before || !word_break_after
                } else if feature_tag == isol {
                    !word_break_before || !word_break_after
                } else {
                    false
                };
            }

            let performed_action = if skip {
                false
            } else {
                run_lookup(lookup_index, feature_tag, &mut processed, &mut remaining)
            };
            if !performed_action {
                processed.push(remaining.remove(0));
            }
        }
        glyph_records = processed;
    }

    if !processing_aalt && !aalt_holding.is_empty() {
        glyph_records = process_lookups_inner(glyph_records, &aalt_holding, reverse_cmap, run_lookup, true);
    }

    glyph_records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{default_on_tags, GSUB_DEFAULT_ON};
    use crate::script::{LangSys, Script};
    use std::collections::HashMap as StdHashMap;

    fn build_table() -> Table<()> {
        let mut scripts = StdHashMap::new();
        scripts.insert(
            tag::DFLT,
            Script {
                default_lang_sys: Some(LangSys {
                    required_feature_index: None,
                    feature_indices: vec![0, 1],
                }),
                lang_sys_records: StdHashMap::new(),
            },
        );
        let script_list = ScriptList::new(scripts);
        let feature_list = FeatureList::new(vec![
            Feature {
                tag: crate::tag!(b"liga"),
                lookup_indices: vec![0],
            },
            Feature {
                tag: crate::tag!(b"calt"),
                lookup_indices: vec![1, 0],
            },
        ]);
        Table::new(script_list, feature_list, vec![], &default_on_tags(GSUB_DEFAULT_ON))
    }

    #[test]
    fn default_on_features_are_enabled() {
        let table = build_table();
        assert_eq!(table.get_feature_state(crate::tag!(b"liga")), Some(true));
    }

    #[test]
    fn applicable_features_sorted_by_lookup_index_then_tag() {
        let _ = env_logger::builder().is_test(true).try_init();
        let table = build_table();
        // Second call exercises the cache-hit trace path.
        table.get_applicable_features(tag::DFLT, None);
        let pairs = table.get_applicable_features(tag::DFLT, None);
        // calt contributes lookup 1 and lookup 0; liga contributes lookup 0.
        // Sorted by (lookupIndex, featureTag): (0,calt),(0,liga),(1,calt).
        assert_eq!(
            pairs,
            vec![
                (crate::tag!(b"calt"), 0),
                (crate::tag!(b"liga"), 0),
                (crate::tag!(b"calt"), 1),
            ]
        );
    }

    #[test]
    fn disabled_feature_is_excluded() {
        let table = build_table();
        table.set_feature_state(crate::tag!(b"calt"), false);
        let pairs = table.get_applicable_features(tag::DFLT, None);
        assert_eq!(pairs, vec![(crate::tag!(b"liga"), 0)]);
    }

    #[test]
    fn process_lookups_skips_uncovered_glyphs_when_no_lookup_acts() {
        let records = vec![GlyphRecord::new("a"), GlyphRecord::new("b")];
        let reverse = crate::cmap::Cmap::new(StdHashMap::new()).reverse();
        let mut run_lookup = |_: usize, _: Tag, _: &mut Vec<GlyphRecord>, _: &mut Vec<GlyphRecord>| false;
        let out = process_lookups(records, &[(crate::tag!(b"liga"), 0)], &reverse, &mut run_lookup);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].glyph_name, "a");
    }
}
