//! GPOS type 7 (contextual positioning), formats 1-3, grounded on
//! `original_source/Lib/compositor/subTablesGPOS.py`'s `GPOSLookupType7*` family
//! and built on the shared [`crate::contextual`] matcher. Structurally identical
//! to `gsub::context`; kept separate since it dispatches through `GposContext`.

use super::GposContext;
use crate::class_def::ClassDef;
use crate::contextual::{apply_context_match, match_context, Predicate};
use crate::coverage::Coverage;
use crate::glyph_record::GlyphRecord;
use crate::tag::Tag;

/// Format 1 rule: an explicit glyph sequence (the head glyph is implied by
/// the owning coverage index) plus the actions to run on a match.
#[derive(Debug, Clone)]
pub struct PosRule {
    pub input: Vec<String>,
    pub actions: Vec<(usize, usize)>,
}

/// Format 2 rule: as [`PosRule`], but glyph classes instead of explicit names.
#[derive(Debug, Clone)]
pub struct PosRuleSet {
    pub input_classes: Vec<u16>,
    pub actions: Vec<(usize, usize)>,
}

fn dispatch(ctx: &mut GposContext, feature_tag: Tag, lookup_list_index: usize, processed: &mut Vec<GlyphRecord>, remaining: &mut Vec<GlyphRecord>) -> bool {
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
    ctx: &mut GposContext,
    coverage: &Coverage,
    rule_sets: &[Vec<PosRule>],
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
    ctx: &mut GposContext,
    coverage: &Coverage,
    class_def: &ClassDef,
    class_rule_sets: &[Vec<PosRuleSet>],
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
    ctx: &mut GposContext,
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
    use crate::value::ValueRecord;

    fn records(names: &[&str]) -> Vec<GlyphRecord> {
        names.iter().map(|n| GlyphRecord::new(*n)).collect()
    }

    #[test]
    fn format1_applies_nested_positioning_lookup_on_match() {
        let nested = Lookup::new(
            LookupFlag(0),
            vec![crate::gpos::Subtable::SingleFormat1 {
                coverage: Coverage::new(vec!["B".into()]),
                value: ValueRecord::new(0, 0, 20, 0),
            }],
        );
        let lookups = vec![nested];

        let coverage = Coverage::new(vec!["A".into()]);
        let rule_sets = vec![vec![PosRule {
            input: vec!["B".into()],
            actions: vec![(1, 0)],
        }]];

        let mut processed = Vec::new();
        let mut remaining = records(&["A", "B", "C"]);
        let mut ctx = GposContext {
            flag: LookupFlag(0),
            lookups: &lookups,
            gdef: None,
        };

        let acted = process_format1(&mut processed, &mut remaining, crate::tag!(b"test"), &mut ctx, &coverage, &rule_sets);
        assert!(acted);
        assert_eq!(processed[0].glyph_name, "A");
        assert_eq!(processed[1].glyph_name, "B");
        assert_eq!(processed[1].x_advance, 20);
        assert_eq!(remaining[0].glyph_name, "C");
    }
}
