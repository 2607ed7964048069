//! GSUB type 5 (contextual substitution), formats 1-3, grounded on
//! `original_source/Lib/compositor/subTablesGSUB.py`'s `ContextSubTable` family
//! and built on the shared [`crate::contextual`] matcher.

use super::GsubContext;
use crate::class_def::ClassDef;
use crate::contextual::{apply_context_match, match_context, Predicate};
use crate::coverage::Coverage;
use crate::glyph_record::GlyphRecord;
use crate::tag::Tag;

/// Format 1 rule: an explicit glyph sequence (the head glyph is implied by
/// the owning coverage index) plus the actions to run on a match.
#[derive(Debug, Clone)]
pub struct SubRule {
    pub input: Vec<String>,
    pub actions: Vec<(usize, usize)>,
}

/// Format 2 rule: as [`SubRule`], but glyph classes instead of explicit names.
#[derive(Debug, Clone)]
pub struct SubClassRule {
    pub input_classes: Vec<u16>,
    pub actions: Vec<(usize, usize)>,
}

/// Runs a nested lookup referenced by a context/chaining action, passing
/// down `feature_tag` unchanged: the tag that selected the outer lookup is
/// the one that should be reported for the nested one too.
fn dispatch(ctx: &mut GsubContext, feature_tag: Tag, lookup_list_index: usize, processed: &mut Vec<GlyphRecord>, remaining: &mut Vec<GlyphRecord>) -> bool {
    let lookup = match ctx.lookups.get(lookup_list_index) {
        Some(lookup) => lookup,
        None => return false,
    };
    let outer_flag = ctx.flag;
    ctx.flag = lookup.flag;
    let mut performed = false;
    for subtable in &lookup.subtables {
        if subtable.process(processed, remaining, feature_tag, ctx) {
            performed = true;
            break;
        }
    }
    ctx.flag = outer_flag;
    performed
}

pub fn process_format1(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    rule_sets: &[Vec<SubRule>],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let rules = &rule_sets[coverage.index(&head_name)];

    for rule in rules {
        let input_predicates: Vec<Predicate> = std::iter::once(Predicate::Glyph(head_name.as_str()))
            .chain(rule.input.iter().map(|s| Predicate::Glyph(s.as_str())))
            .collect();
        if let Some(result) = match_context(processed, remaining, &[], &input_predicates, &[], ctx.flag, ctx.gdef) {
            return apply_context_match(processed, remaining, result, &rule.actions, |idx, p, r| {
                dispatch(ctx, feature_tag, idx, p, r)
            });
        }
    }
    false
}

pub fn process_format2(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    class_def: &ClassDef,
    class_rule_sets: &[Vec<SubClassRule>],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let head_class = class_def.get(&head_name);
    let rules = match class_rule_sets.get(head_class as usize) {
        Some(rules) => rules,
        None => return false,
    };

    for rule in rules {
        let input_predicates: Vec<Predicate> = std::iter::once(Predicate::Class(class_def, head_class))
            .chain(rule.input_classes.iter().map(|c| Predicate::Class(class_def, *c)))
            .collect();
        if let Some(result) = match_context(processed, remaining, &[], &input_predicates, &[], ctx.flag, ctx.gdef) {
            return apply_context_match(processed, remaining, result, &rule.actions, |idx, p, r| {
                dispatch(ctx, feature_tag, idx, p, r)
            });
        }
    }
    false
}

pub fn process_format3(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GsubContext,
    input_coverages: &[Coverage],
    actions: &[(usize, usize)],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    if input_coverages.is_empty() || !input_coverages[0].contains(&remaining[0].glyph_name) {
        return false;
    }
    let input_predicates: Vec<Predicate> = input_coverages.iter().map(Predicate::Coverage).collect();
    match match_context(processed, remaining, &[], &input_predicates, &[], ctx.flag, ctx.gdef) {
        Some(result) => apply_context_match(processed, remaining, result, actions, |idx, p, r| {
            dispatch(ctx, feature_tag, idx, p, r)
        }),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{Lookup, LookupFlag};
    use crate::random::FixedRandomSource;

    fn records(names: &[&str]) -> Vec<GlyphRecord> {
        names.iter().map(|n| GlyphRecord::new(*n)).collect()
    }

    #[test]
    fn format1_applies_nested_lookup_on_match() {
        let nested = Lookup::new(
            LookupFlag(0),
            vec![crate::gsub::Subtable::Single {
                coverage: Coverage::new(vec!["B".into()]),
                substitutes: vec!["B.sub".into()],
            }],
        );
        let lookups = vec![nested];

        let coverage = Coverage::new(vec!["A".into()]);
        let rule_sets = vec![vec![SubRule {
            input: vec!["B".into()],
            actions: vec![(1, 0)],
        }]];

        let mut processed = Vec::new();
        let mut remaining = records(&["A", "B", "C"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &lookups,
            gdef: None,
            rand: &mut rand,
        };

        let acted = process_format1(&mut processed, &mut remaining, crate::tag!(b"test"), &mut ctx, &coverage, &rule_sets);
        assert!(acted);
        assert_eq!(processed[0].glyph_name, "A");
        assert_eq!(processed[1].glyph_name, "B.sub");
        assert_eq!(remaining[0].glyph_name, "C");
    }

    #[test]
    fn format3_consumes_match_even_when_nested_lookup_is_inert() {
        // The nested lookup is a ligature needing a following "y" that isn't
        // there; its single subtable reports performed=false. The outer
        // match still has to consume its matched input region, or the
        // stream processor's `while !remaining.is_empty()` loop never
        // advances.
        let nested = Lookup::new(
            LookupFlag(0),
            vec![crate::gsub::Subtable::Ligature {
                coverage: Coverage::new(vec!["A".into()]),
                ligature_sets: vec![vec![crate::gsub::Ligature {
                    component_glyphs: vec!["y".into()],
                    lig_glyph: "Ay".into(),
                }]],
            }],
        );
        let lookups = vec![nested];

        let input_coverages = vec![Coverage::new(vec!["A".into()])];
        let actions = vec![(0, 0)];

        let mut processed = Vec::new();
        let mut remaining = records(&["A"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &lookups,
            gdef: None,
            rand: &mut rand,
        };

        let acted = process_format3(&mut processed, &mut remaining, crate::tag!(b"test"), &mut ctx, &input_coverages, &actions);
        assert!(!acted);
        assert!(remaining.is_empty());
        assert_eq!(processed[0].glyph_name, "A");
    }

    #[test]
    fn format3_multiple_actions_do_not_drift_on_later_sequence_index() {
        // input=[{A},{B},{C},{D}], actions=[(1, subB), (3, subD)]. Neither
        // nested lookup changes the stream length, so the raw (unadjusted)
        // matched index used for the second action must still land on D,
        // not spill past the end of the match.
        let sub_b = Lookup::new(
            LookupFlag(0),
            vec![crate::gsub::Subtable::Single {
                coverage: Coverage::new(vec!["B".into()]),
                substitutes: vec!["B.sub".into()],
            }],
        );
        let sub_d = Lookup::new(
            LookupFlag(0),
            vec![crate::gsub::Subtable::Single {
                coverage: Coverage::new(vec!["D".into()]),
                substitutes: vec!["D.sub".into()],
            }],
        );
        let lookups = vec![sub_b, sub_d];

        let input_coverages = vec![
            Coverage::new(vec!["A".into()]),
            Coverage::new(vec!["B".into()]),
            Coverage::new(vec!["C".into()]),
            Coverage::new(vec!["D".into()]),
        ];
        let actions = vec![(1, 0), (3, 1)];

        let mut processed = Vec::new();
        let mut remaining = records(&["A", "B", "C", "D"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &lookups,
            gdef: None,
            rand: &mut rand,
        };

        let acted = process_format3(&mut processed, &mut remaining, crate::tag!(b"test"), &mut ctx, &input_coverages, &actions);
        assert!(acted);
        assert!(remaining.is_empty());
        let names: Vec<&str> = processed.iter().map(|r| r.glyph_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B.sub", "C", "D.sub"]);
    }
}
