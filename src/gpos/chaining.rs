//! GPOS type 8 (chaining contextual positioning), formats 1-3, grounded on
//! `original_source/Lib/compositor/subTablesGPOS.py`'s `GPOSLookupType8*` family
//! and built on the shared [`crate::contextual`] matcher. Structurally identical
//! to `gsub::chaining`; kept separate since it dispatches through `GposContext`.

use super::GposContext;
use crate::class_def::ClassDef;
use crate::contextual::{apply_context_match, match_context, Predicate};
use crate::coverage::Coverage;
use crate::glyph_record::GlyphRecord;
use crate::tag::Tag;

/// Format 1 rule: explicit glyph names in all three sections (the head glyph
/// of the input section is implied by the owning coverage index).
#[derive(Debug, Clone)]
pub struct ChainPosRule {
    pub backtrack: Vec<String>,
    pub input: Vec<String>,
    pub lookahead: Vec<String>,
    pub actions: Vec<(usize, usize)>,
}

/// Format 2 rule: as [`ChainPosRule`], but glyph classes.
#[derive(Debug, Clone)]
pub struct ChainPosRuleSet {
    pub backtrack_classes: Vec<u16>,
    pub input_classes: Vec<u16>,
    pub lookahead_classes: Vec<u16>,
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
    chain_rule_sets: &[Vec<ChainPosRule>],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let rules = &chain_rule_sets[coverage.index(&head_name)];

    for rule in rules {
        let backtrack: Vec<Predicate> = rule.backtrack.iter().map(|s| Predicate::Glyph(s.as_str())).collect();
        let input: Vec<Predicate> = std::iter::once(Predicate::Glyph(head_name.as_str()))
            .chain(rule.input.iter().map(|s| Predicate::Glyph(s.as_str())))
            .collect();
        let lookahead: Vec<Predicate> = rule.lookahead.iter().map(|s| Predicate::Glyph(s.as_str())).collect();

        if let Some(result) = match_context(processed, remaining, &backtrack, &input, &lookahead, ctx.flag, ctx.gdef) {
            return apply_context_match(processed, remaining, result, &rule.actions, |idx, p, r| {
                dispatch(ctx, feature_tag, idx, p, r)
            });
        }
    }
    false
}

#[allow(clippy::too_many_arguments)]
pub fn process_format2(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GposContext,
    coverage: &Coverage,
    backtrack_class_def: &ClassDef,
    input_class_def: &ClassDef,
    lookahead_class_def: &ClassDef,
    chain_class_rule_sets: &[Vec<ChainPosRuleSet>],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let head_class = input_class_def.get(&head_name);
    let rules = match chain_class_rule_sets.get(head_class as usize) {
        Some(rules) => rules,
        None => return false,
    };

    for rule in rules {
        let backtrack: Vec<Predicate> = rule
            .backtrack_classes
            .iter()
            .map(|c| Predicate::Class(backtrack_class_def, *c))
            .collect();
        let input: Vec<Predicate> = std::iter::once(Predicate::Class(input_class_def, head_class))
            .chain(rule.input_classes.iter().map(|c| Predicate::Class(input_class_def, *c)))
            .collect();
        let lookahead: Vec<Predicate> = rule
            .lookahead_classes
            .iter()
            .map(|c| Predicate::Class(lookahead_class_def, *c))
            .collect();

        if let Some(result) = match_context(processed, remaining, &backtrack, &input, &lookahead, ctx.flag, ctx.gdef) {
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
    backtrack_coverages: &[Coverage],
    input_coverages: &[Coverage],
    lookahead_coverages: &[Coverage],
    actions: &[(usize, usize)],
) -> bool {
    if remaining.is_empty() || ctx.flag.covers_glyph(&remaining[0].glyph_name, ctx.gdef) {
        return false;
    }
    if input_coverages.is_empty() || !input_coverages[0].contains(&remaining[0].glyph_name) {
        return false;
    }
    let backtrack: Vec<Predicate> = backtrack_coverages.iter().map(Predicate::Coverage).collect();
    let input: Vec<Predicate> = input_coverages.iter().map(Predicate::Coverage).collect();
    let lookahead: Vec<Predicate> = lookahead_coverages.iter().map(Predicate::Coverage).collect();

    match match_context(processed, remaining, &backtrack, &input, &lookahead, ctx.flag, ctx.gdef) {
        Some(result) => apply_context_match(processed, remaining, result, actions, |idx, p, r| {
            dispatch(ctx, feature_tag, idx, p, r)
        }),
        None => false,
    }
}
