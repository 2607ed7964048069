//! GSUB lookup subtable evaluators, grounded on
//! `original_source/Lib/compositor/subTablesGSUB.py`.

mod chaining;
mod context;

use crate::class_def::ClassDef;
use crate::coverage::Coverage;
use crate::feature::RAND;
use crate::gdef::Gdef;
use crate::glyph_record::GlyphRecord;
use crate::lookup::{Lookup, LookupFlag};
use crate::random::RandomSource;
use crate::tag::Tag;

pub use chaining::{ChainRule, ChainRuleSet};
pub use context::{SubClassRule, SubRule};

/// One ligature entry: the components (after the head glyph, which is
/// selected by coverage) required to produce `lig_glyph`.
#[derive(Debug, Clone)]
pub struct Ligature {
    pub component_glyphs: Vec<String>,
    pub lig_glyph: String,
}

/// Per-table context passed down into every subtable's `process`. The
/// current lookup's flag is set by the lookup-iteration loop in
/// `engine.rs` before each subtable is tried, following the arena-and-index
/// strategy: subtables hold no back-reference to their owning lookup or
/// table, and instead receive one here.
pub struct GsubContext<'a> {
    pub flag: LookupFlag,
    pub lookups: &'a [Lookup<Subtable>],
    pub gdef: Option<&'a Gdef>,
    pub rand: &'a mut dyn RandomSource,
}

/// A tagged variant over the GSUB subtable formats (model as a
/// tagged variant... dispatch via a match on the variant).
#[derive(Debug, Clone)]
pub enum Subtable {
    /// Type 1: coverage-parallel single substitution.
    Single {
        coverage: Coverage,
        substitutes: Vec<String>,
    },
    /// Type 2: coverage-parallel sequence substitution.
    Multiple {
        coverage: Coverage,
        sequences: Vec<Vec<String>>,
    },
    /// Type 3: coverage-parallel alternate sets.
    Alternate {
        coverage: Coverage,
        alternate_sets: Vec<Vec<String>>,
    },
    /// Type 4: coverage-parallel ligature sets.
    Ligature {
        coverage: Coverage,
        ligature_sets: Vec<Vec<Ligature>>,
    },
    /// Type 5 format 1: explicit glyph sequence context.
    ContextFormat1 {
        coverage: Coverage,
        rule_sets: Vec<Vec<SubRule>>,
    },
    /// Type 5 format 2: class-based context.
    ContextFormat2 {
        coverage: Coverage,
        class_def: ClassDef,
        class_rule_sets: Vec<Vec<SubClassRule>>,
    },
    /// Type 5 format 3: coverage-based context.
    ContextFormat3 {
        input_coverages: Vec<Coverage>,
        actions: Vec<(usize, usize)>,
    },
    /// Type 6 format 1: explicit glyph chaining context.
    ChainFormat1 {
        coverage: Coverage,
        chain_rule_sets: Vec<Vec<ChainRule>>,
    },
    /// Type 6 format 2: class-based chaining context.
    ChainFormat2 {
        coverage: Coverage,
        backtrack_class_def: ClassDef,
        input_class_def: ClassDef,
        lookahead_class_def: ClassDef,
        chain_class_rule_sets: Vec<Vec<ChainRuleSet>>,
    },
    /// Type 6 format 3: coverage-based chaining context.
    ChainFormat3 {
        backtrack_coverages: Vec<Coverage>,
        input_coverages: Vec<Coverage>,
        lookahead_coverages: Vec<Coverage>,
        actions: Vec<(usize, usize)>,
    },
    /// Type 7: transparently delegates to an inner subtable.
    Extension(Box<Subtable>),
    /// Type 8: declared but not implemented; always a no-op.
    ReverseChaining,
}

impl Subtable {
    /// Short name for the logger's `subTable type=` attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            Subtable::Single { .. } => "Single",
            Subtable::Multiple { .. } => "Multiple",
            Subtable::Alternate { .. } => "Alternate",
            Subtable::Ligature { .. } => "Ligature",
            Subtable::ContextFormat1 { .. } => "ContextFormat1",
            Subtable::ContextFormat2 { .. } => "ContextFormat2",
            Subtable::ContextFormat3 { .. } => "ContextFormat3",
            Subtable::ChainFormat1 { .. } => "ChainFormat1",
            Subtable::ChainFormat2 { .. } => "ChainFormat2",
            Subtable::ChainFormat3 { .. } => "ChainFormat3",
            Subtable::Extension(inner) => inner.type_name(),
            Subtable::ReverseChaining => "ReverseChaining",
        }
    }

    /// Returns `true` if this subtable performed an action, in which case
    /// `processed`/`remaining` have been mutated accordingly. Otherwise both
    /// are left untouched.
    pub fn process(
        &self,
        processed: &mut Vec<GlyphRecord>,
        remaining: &mut Vec<GlyphRecord>,
        feature_tag: Tag,
        ctx: &mut GsubContext,
    ) -> bool {
        match self {
            Subtable::Single {
                coverage,
                substitutes,
            } => process_single(processed, remaining, feature_tag, ctx, coverage, substitutes),
            Subtable::Multiple {
                coverage,
                sequences,
            } => process_multiple(processed, remaining, ctx, coverage, sequences),
            Subtable::Alternate {
                coverage,
                alternate_sets,
            } => process_alternate(processed, remaining, feature_tag, ctx, coverage, alternate_sets),
            Subtable::Ligature {
                coverage,
                ligature_sets,
            } => process_ligature(processed, remaining, ctx, coverage, ligature_sets),
            Subtable::ContextFormat1 { coverage, rule_sets } => {
                context::process_format1(processed, remaining, feature_tag, ctx, coverage, rule_sets)
            }
            Subtable::ContextFormat2 {
                coverage,
                class_def,
                class_rule_sets,
            } => context::process_format2(processed, remaining, feature_tag, ctx, coverage, class_def, class_rule_sets),
            Subtable::ContextFormat3 {
                input_coverages,
                actions,
            } => context::process_format3(processed, remaining, feature_tag, ctx, input_coverages, actions),
            Subtable::ChainFormat1 {
                coverage,
                chain_rule_sets,
            } => chaining::process_format1(processed, remaining, feature_tag, ctx, coverage, chain_rule_sets),
            Subtable::ChainFormat2 {
                coverage,
                backtrack_class_def,
                input_class_def,
                lookahead_class_def,
                chain_class_rule_sets,
            } => chaining::process_format2(
                processed,
                remaining,
                feature_tag,
                ctx,
                coverage,
                backtrack_class_def,
                input_class_def,
                lookahead_class_def,
                chain_class_rule_sets,
            ),
            Subtable::ChainFormat3 {
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                actions,
            } => chaining::process_format3(
                processed,
                remaining,
                feature_tag,
                ctx,
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                actions,
            ),
            Subtable::Extension(inner) => inner.process(processed, remaining, feature_tag, ctx),
            Subtable::ReverseChaining => false,
        }
    }
}

fn head_eligible(remaining: &[GlyphRecord], flag: LookupFlag, gdef: Option<&Gdef>) -> bool {
    match remaining.first() {
        Some(record) => !flag.covers_glyph(&record.glyph_name, gdef),
        None => false,
    }
}

fn process_single(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    substitutes: &[String],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let substitute = &substitutes[coverage.index(&head_name)];

    if feature_tag == crate::feature::AALT {
        remaining[0].push_alternate(substitute.clone());
    } else {
        remaining[0].substitute(substitute.clone());
    }
    let record = remaining.remove(0);
    processed.push(record);
    true
}

fn process_multiple(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    sequences: &[Vec<String>],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let sequence = &sequences[coverage.index(&head_name)];
    remaining.remove(0);
    for name in sequence {
        processed.push(GlyphRecord::new(name.clone()));
    }
    true
}

fn process_alternate(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    feature_tag: Tag,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    alternate_sets: &[Vec<String>],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let alternates = &alternate_sets[coverage.index(&head_name)];

    if feature_tag == RAND {
        if alternates.is_empty() {
            return false;
        }
        let pick = ctx.rand.pick_index(alternates.len());
        remaining[0].substitute(alternates[pick].clone());
    } else {
        remaining[0].set_alternates(alternates.clone());
    }
    let record = remaining.remove(0);
    processed.push(record);
    true
}

fn process_ligature(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GsubContext,
    coverage: &Coverage,
    ligature_sets: &[Vec<Ligature>],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let ligatures = &ligature_sets[coverage.index(&head_name)];

    'ligatures: for ligature in ligatures {
        // Match `ligature.component_glyphs` against subsequent records,
        // skipping flag-covered ones, tracking which stream indexes matched.
        let mut matched_indexes = Vec::with_capacity(ligature.component_glyphs.len());
        let mut cursor = 1usize;
        for component in &ligature.component_glyphs {
            loop {
                let candidate = match remaining.get(cursor) {
                    Some(record) => record,
                    None => continue 'ligatures,
                };
                if ctx.flag.covers_glyph(&candidate.glyph_name, ctx.gdef) {
                    cursor += 1;
                    continue;
                }
                if &candidate.glyph_name == component {
                    matched_indexes.push(cursor);
                    cursor += 1;
                    break;
                }
                continue 'ligatures;
            }
        }

        let components: Vec<String> = std::iter::once(head_name.clone())
            .chain(ligature.component_glyphs.iter().cloned())
            .collect();

        // Remove matched components (highest index first so earlier indexes
        // stay valid), leaving unmatched interleaved skipped glyphs in place.
        for &index in matched_indexes.iter().rev() {
            remaining.remove(index);
        }
        remaining[0].substitute_ligature(ligature.lig_glyph.clone(), components);
        let record = remaining.remove(0);
        processed.push(record);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandomSource;

    fn records(names: &[&str]) -> Vec<GlyphRecord> {
        names.iter().map(|n| GlyphRecord::new(*n)).collect()
    }

    #[test]
    fn single_substitution_rewrites_head() {
        let coverage = Coverage::new(vec!["a".into()]);
        let subtable = Subtable::Single {
            coverage,
            substitutes: vec!["a.sc".into()],
        };
        let mut processed = Vec::new();
        let mut remaining = records(&["a", "b"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &[],
            gdef: None,
            rand: &mut rand,
        };
        let acted = subtable.process(&mut processed, &mut remaining, crate::tag!(b"liga"), &mut ctx);
        assert!(acted);
        assert_eq!(processed[0].glyph_name, "a.sc");
        assert_eq!(remaining[0].glyph_name, "b");
    }

    #[test]
    fn aalt_feature_appends_alternate_without_renaming() {
        let coverage = Coverage::new(vec!["a".into()]);
        let subtable = Subtable::Single {
            coverage,
            substitutes: vec!["a.alt".into()],
        };
        let mut processed = Vec::new();
        let mut remaining = records(&["a"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &[],
            gdef: None,
            rand: &mut rand,
        };
        subtable.process(&mut processed, &mut remaining, crate::feature::AALT, &mut ctx);
        assert_eq!(processed[0].glyph_name, "a");
        assert_eq!(processed[0].alternates, vec!["a.alt"]);
    }

    #[test]
    fn ligature_substitution_matches_and_merges() {
        let coverage = Coverage::new(vec!["f".into()]);
        let subtable = Subtable::Ligature {
            coverage,
            ligature_sets: vec![vec![Ligature {
                component_glyphs: vec!["i".into()],
                lig_glyph: "fi".into(),
            }]],
        };
        let mut processed = Vec::new();
        let mut remaining = records(&["f", "i", "x"]);
        let mut rand = FixedRandomSource::new(vec![]);
        let mut ctx = GsubContext {
            flag: LookupFlag(0),
            lookups: &[],
            gdef: None,
            rand: &mut rand,
        };
        let acted = subtable.process(&mut processed, &mut remaining, crate::tag!(b"liga"), &mut ctx);
        assert!(acted);
        assert_eq!(processed[0].glyph_name, "fi");
        assert_eq!(processed[0].ligature_components, vec!["f", "i"]);
        assert_eq!(remaining[0].glyph_name, "x");
    }
}
