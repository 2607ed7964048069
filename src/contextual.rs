//! Shared contextual/chaining-contextual matching and recursion engine,
//! grounded on `original_source/Lib/compositor/subTablesBase.py`'s
//! `BaseContextSubTable`/`BaseChainingContextSubTable`.

use crate::class_def::ClassDef;
use crate::coverage::Coverage;
use crate::gdef::Gdef;
use crate::glyph_record::GlyphRecord;
use crate::lookup::LookupFlag;

/// One element of a backtrack/input/lookahead sequence. The three formats
/// vary only in this equality predicate.
pub enum Predicate<'a> {
    Glyph(&'a str),
    Class(&'a ClassDef, u16),
    Coverage(&'a Coverage),
}

impl Predicate<'_> {
    pub fn matches(&self, glyph: &str) -> bool {
        match self {
            Predicate::Glyph(name) => *name == glyph,
            Predicate::Class(class_def, class) => class_def.get(glyph) == *class,
            Predicate::Coverage(coverage) => coverage.contains(glyph),
        }
    }
}

/// Walks `names` left to right from its start, skipping flag-covered glyphs,
/// and accepts exactly `predicates.len()` elements satisfying their
/// corresponding predicate in order. Returns the absolute index (into `names`)
/// of every *matched* (non-skipped) element, or `None` if the stream runs out
/// before the sequence is satisfied or a non-skipped glyph fails its
/// predicate.
pub fn match_sequence(
    names: &[&str],
    predicates: &[Predicate],
    flag: LookupFlag,
    gdef: Option<&Gdef>,
) -> Option<Vec<usize>> {
    let mut matched_indexes = Vec::with_capacity(predicates.len());
    let mut cursor = 0usize;
    for predicate in predicates {
        loop {
            let name = *names.get(cursor)?;
            if flag.covers_glyph(name, gdef) {
                cursor += 1;
                continue;
            }
            if predicate.matches(name) {
                matched_indexes.push(cursor);
                cursor += 1;
                break;
            }
            return None;
        }
    }
    Some(matched_indexes)
}

/// `names` for the processed prefix read right-to-left (nearest-first), used
/// for backtrack matching.
pub fn reversed_names(records: &[GlyphRecord]) -> Vec<&str> {
    records
        .iter()
        .rev()
        .map(|r| r.glyph_name.as_str())
        .collect()
}

pub fn forward_names(records: &[GlyphRecord]) -> Vec<&str> {
    records.iter().map(|r| r.glyph_name.as_str()).collect()
}

/// The outcome of matching all three context sections.
pub struct ContextMatch {
    /// Absolute index (into the `remaining` slice passed to matching) of each
    /// matched input element, in order.
    pub matched_indexes: Vec<usize>,
    /// Index in `remaining` just past the last matched input element — the
    /// boundary between the input region and lookahead.
    pub match_end: usize,
}

/// Matches backtrack (optional, right-to-left against `processed`), input
/// (against `remaining`, whose first element is assumed already known to
/// satisfy `input[0]` by the caller's own coverage check), and lookahead
/// (optional, against the stream beyond the input) in one pass. Returns
/// `None` if any section fails to match.
pub fn match_context(
    processed: &[GlyphRecord],
    remaining: &[GlyphRecord],
    backtrack: &[Predicate],
    input: &[Predicate],
    lookahead: &[Predicate],
    flag: LookupFlag,
    gdef: Option<&Gdef>,
) -> Option<ContextMatch> {
    if !backtrack.is_empty() {
        let names = reversed_names(processed);
        match_sequence(&names, backtrack, flag, gdef)?;
    }

    let remaining_names = forward_names(remaining);
    let matched_indexes = match_sequence(&remaining_names, input, flag, gdef)?;
    let match_end = matched_indexes.last().map(|i| i + 1).unwrap_or(0);

    if !lookahead.is_empty() {
        let tail_names = &remaining_names[match_end..];
        match_sequence(tail_names, lookahead, flag, gdef)?;
    }

    Some(ContextMatch {
        matched_indexes,
        match_end,
    })
}

/// Applies a matched context's nested-lookup actions once a [`ContextMatch`]
/// has been found, mirroring `subTablesBase.py`'s `_processMatch` exactly.
///
/// The entire matched input region (`remaining[..result.match_end]`) is
/// isolated into an `eligible` buffer up front. For each
/// `(sequence_index, lookup_list_index)` action in order: `sequence_index`
/// is resolved through the *original* `matched_indexes` (no running
/// adjustment — the source re-slices the same `eligibleRecords` by the raw
/// match index every time) to split `eligible` into a back part and an
/// input part, `dispatch(lookup_list_index, back, input)` lets the nested
/// lookup act on that isolated pair — never reaching into the lookahead or
/// the stream beyond the match — and the two parts are always recombined
/// into `eligible` afterward, whether or not the nested lookup performed.
///
/// Once every action has run, `eligible` (reflecting whatever the nested
/// actions did to it) is moved into `processed` unconditionally — even when
/// no nested action actually performed — and `remaining` becomes whatever
/// followed the matched region. The return value is the last action's
/// `dispatch` result (or `true` if there were no actions at all, in which
/// case the match is simply moved into `processed` as-is): the caller's own
/// `process()` reports exactly this value, so a matched-but-inert context
/// still consumes its input region and still may report `performed=false`,
/// matching source behavior precisely.
pub fn apply_context_match(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    result: ContextMatch,
    actions: &[(usize, usize)],
    mut dispatch: impl FnMut(usize, &mut Vec<GlyphRecord>, &mut Vec<GlyphRecord>) -> bool,
) -> bool {
    if actions.is_empty() {
        let moved: Vec<GlyphRecord> = remaining.drain(0..result.match_end).collect();
        processed.extend(moved);
        return true;
    }

    let mut eligible: Vec<GlyphRecord> = remaining.drain(0..result.match_end).collect();
    let mut performed = false;
    for &(sequence_index, lookup_list_index) in actions {
        let match_index = match result.matched_indexes.get(sequence_index) {
            Some(index) => (*index).min(eligible.len()),
            None => continue,
        };
        let mut back: Vec<GlyphRecord> = eligible.drain(0..match_index).collect();
        let mut input = std::mem::take(&mut eligible);
        performed = dispatch(lookup_list_index, &mut back, &mut input);
        back.append(&mut input);
        eligible = back;
    }
    processed.append(&mut eligible);
    performed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph_record::GlyphRecord;

    fn records(names: &[&str]) -> Vec<GlyphRecord> {
        names.iter().map(|n| GlyphRecord::new(*n)).collect()
    }

    #[test]
    fn format1_matches_explicit_glyph_sequence() {
        let remaining = records(&["A", "space", "B"]);
        let predicates = vec![
            Predicate::Glyph("A"),
            Predicate::Glyph("space"),
            Predicate::Glyph("B"),
        ];
        let names = forward_names(&remaining);
        let matched = match_sequence(&names, &predicates, LookupFlag(0), None).unwrap();
        assert_eq!(matched, vec![0, 1, 2]);
    }

    #[test]
    fn match_fails_on_mismatch() {
        let remaining = records(&["A", "space", "X"]);
        let predicates = vec![Predicate::Glyph("A"), Predicate::Glyph("space"), Predicate::Glyph("B")];
        let names = forward_names(&remaining);
        assert!(match_sequence(&names, &predicates, LookupFlag(0), None).is_none());
    }

    #[test]
    fn apply_with_no_actions_moves_whole_match() {
        let mut processed = Vec::new();
        let mut remaining = records(&["A", "space", "B", "C"]);
        let result = ContextMatch {
            matched_indexes: vec![0, 1, 2],
            match_end: 3,
        };
        apply_context_match(&mut processed, &mut remaining, result, &[], |_, _, _| false);
        assert_eq!(
            processed.iter().map(|r| r.glyph_name.as_str()).collect::<Vec<_>>(),
            vec!["A", "space", "B"]
        );
        assert_eq!(remaining.len(), 1);
    }
}
