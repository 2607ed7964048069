//! GPOS lookup subtable evaluators, grounded on
//! `original_source/Lib/compositor/subTablesGPOS.py`.

mod chaining;
mod context;

use crate::class_def::ClassDef;
use crate::coverage::Coverage;
use crate::gdef::{glyph_class, Gdef};
use crate::glyph_record::GlyphRecord;
use crate::lookup::{Lookup, LookupFlag};
use crate::tag::Tag;
use crate::value::{Anchor, ValueRecord};

pub use chaining::{ChainPosRule, ChainPosRuleSet};
pub use context::{PosRule, PosRuleSet};

/// One glyph-pair's adjustment, keyed by `SecondGlyph` within a `PairSet`.
#[derive(Debug, Clone)]
pub struct PairValueRecord {
    pub second_glyph: String,
    pub value1: ValueRecord,
    pub value2: ValueRecord,
}

/// One glyph-class-pair's adjustment (format 2's `Class1Record`/`Class2Record`
/// collapsed to the pair actually needed by `process`).
#[derive(Debug, Clone)]
pub struct Class2Record {
    pub value1: ValueRecord,
    pub value2: ValueRecord,
}

/// `EntryExitRecord`: the attachment points used by cursive attachment.
/// Either side may be absent (spec: an anchor is optional per OpenType).
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryExitRecord {
    pub entry_anchor: Option<Anchor>,
    pub exit_anchor: Option<Anchor>,
}

/// `MarkRecord`: a mark's class and its anchor relative to its own origin.
#[derive(Debug, Clone, Copy)]
pub struct MarkRecord {
    pub class: u16,
    pub mark_anchor: Anchor,
}

/// `BaseRecord`: one anchor per mark class, indexed by `MarkRecord::class`.
#[derive(Debug, Clone, Default)]
pub struct BaseRecord {
    pub base_anchor: Vec<Option<Anchor>>,
}

/// `ComponentRecord`: one anchor per mark class for a single ligature component.
#[derive(Debug, Clone, Default)]
pub struct ComponentRecord {
    pub ligature_anchor: Vec<Option<Anchor>>,
}

/// `LigatureAttach`: the per-component anchors of one ligature glyph.
#[derive(Debug, Clone, Default)]
pub struct LigatureAttach {
    pub component_record: Vec<ComponentRecord>,
}

/// `Mark2Record`: as [`BaseRecord`], but for mark-to-mark attachment.
#[derive(Debug, Clone, Default)]
pub struct Mark2Record {
    pub mark2_anchor: Vec<Option<Anchor>>,
}

/// Per-table context passed down into every subtable's `process`, mirroring
/// `gsub::GsubContext`'s arena-and-index strategy. GPOS has no randomness
/// feature, so unlike `GsubContext` this carries no RNG.
pub struct GposContext<'a> {
    pub flag: LookupFlag,
    pub lookups: &'a [Lookup<Subtable>],
    pub gdef: Option<&'a Gdef>,
}

/// A tagged variant over the GPOS subtable formats.
#[derive(Debug, Clone)]
pub enum Subtable {
    /// Type 1 format 1: one shared adjustment for every coverage glyph.
    SingleFormat1 { coverage: Coverage, value: ValueRecord },
    /// Type 1 format 2: coverage-parallel per-glyph adjustment.
    SingleFormat2 {
        coverage: Coverage,
        values: Vec<ValueRecord>,
    },
    /// Type 2 format 1: coverage-parallel explicit glyph pairs.
    PairFormat1 {
        coverage: Coverage,
        value_format1: bool,
        value_format2: bool,
        pair_sets: Vec<Vec<PairValueRecord>>,
    },
    /// Type 2 format 2: glyph-class pairs.
    PairFormat2 {
        coverage: Coverage,
        value_format1: bool,
        value_format2: bool,
        class_def1: ClassDef,
        class_def2: ClassDef,
        class1_records: Vec<Vec<Class2Record>>,
    },
    /// Type 3: cursive attachment via per-glyph entry/exit anchors.
    Cursive {
        coverage: Coverage,
        entry_exit_records: Vec<EntryExitRecord>,
    },
    /// Type 4: mark-to-base attachment.
    MarkToBase {
        mark_coverage: Coverage,
        base_coverage: Coverage,
        mark_array: Vec<MarkRecord>,
        base_array: Vec<BaseRecord>,
    },
    /// Type 5: mark-to-ligature attachment.
    MarkToLigature {
        mark_coverage: Coverage,
        ligature_coverage: Coverage,
        mark_array: Vec<MarkRecord>,
        ligature_array: Vec<LigatureAttach>,
    },
    /// Type 6: mark-to-mark attachment.
    MarkToMark {
        mark1_coverage: Coverage,
        mark2_coverage: Coverage,
        mark1_array: Vec<MarkRecord>,
        mark2_array: Vec<Mark2Record>,
    },
    /// Type 7 format 1: explicit glyph sequence context.
    ContextFormat1 {
        coverage: Coverage,
        rule_sets: Vec<Vec<PosRule>>,
    },
    /// Type 7 format 2: class-based context.
    ContextFormat2 {
        coverage: Coverage,
        class_def: ClassDef,
        class_rule_sets: Vec<Vec<PosRuleSet>>,
    },
    /// Type 7 format 3: coverage-based context.
    ContextFormat3 {
        input_coverages: Vec<Coverage>,
        actions: Vec<(usize, usize)>,
    },
    /// Type 8 format 1: explicit glyph chaining context.
    ChainFormat1 {
        coverage: Coverage,
        chain_rule_sets: Vec<Vec<ChainPosRule>>,
    },
    /// Type 8 format 2: class-based chaining context.
    ChainFormat2 {
        coverage: Coverage,
        backtrack_class_def: ClassDef,
        input_class_def: ClassDef,
        lookahead_class_def: ClassDef,
        chain_class_rule_sets: Vec<Vec<ChainPosRuleSet>>,
    },
    /// Type 8 format 3: coverage-based chaining context.
    ChainFormat3 {
        backtrack_coverages: Vec<Coverage>,
        input_coverages: Vec<Coverage>,
        lookahead_coverages: Vec<Coverage>,
        actions: Vec<(usize, usize)>,
    },
    /// Type 9: transparently delegates to an inner subtable.
    Extension(Box<Subtable>),
}

impl Subtable {
    /// Short name for the logger's `subTable type=` attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            Subtable::SingleFormat1 { .. } => "SingleFormat1",
            Subtable::SingleFormat2 { .. } => "SingleFormat2",
            Subtable::PairFormat1 { .. } => "PairFormat1",
            Subtable::PairFormat2 { .. } => "PairFormat2",
            Subtable::Cursive { .. } => "Cursive",
            Subtable::MarkToBase { .. } => "MarkToBase",
            Subtable::MarkToLigature { .. } => "MarkToLigature",
            Subtable::MarkToMark { .. } => "MarkToMark",
            Subtable::ContextFormat1 { .. } => "ContextFormat1",
            Subtable::ContextFormat2 { .. } => "ContextFormat2",
            Subtable::ContextFormat3 { .. } => "ContextFormat3",
            Subtable::ChainFormat1 { .. } => "ChainFormat1",
            Subtable::ChainFormat2 { .. } => "ChainFormat2",
            Subtable::ChainFormat3 { .. } => "ChainFormat3",
            Subtable::Extension(inner) => inner.type_name(),
        }
    }

    /// Returns `true` if this subtable performed an adjustment, in which case
    /// `processed`/`remaining` have been mutated accordingly. Otherwise both
    /// are left untouched.
    pub fn process(
        &self,
        processed: &mut Vec<GlyphRecord>,
        remaining: &mut Vec<GlyphRecord>,
        feature_tag: Tag,
        ctx: &mut GposContext,
    ) -> bool {
        match self {
            Subtable::SingleFormat1 { coverage, value } => process_single_format1(processed, remaining, ctx, coverage, *value),
            Subtable::SingleFormat2 { coverage, values } => process_single_format2(processed, remaining, ctx, coverage, values),
            Subtable::PairFormat1 {
                coverage,
                value_format1,
                value_format2,
                pair_sets,
            } => process_pair_format1(processed, remaining, ctx, coverage, *value_format1, *value_format2, pair_sets),
            Subtable::PairFormat2 {
                coverage,
                value_format1,
                value_format2,
                class_def1,
                class_def2,
                class1_records,
            } => process_pair_format2(
                processed,
                remaining,
                ctx,
                coverage,
                *value_format1,
                *value_format2,
                class_def1,
                class_def2,
                class1_records,
            ),
            Subtable::Cursive {
                coverage,
                entry_exit_records,
            } => process_cursive(processed, remaining, ctx, coverage, entry_exit_records),
            Subtable::MarkToBase {
                mark_coverage,
                base_coverage,
                mark_array,
                base_array,
            } => process_mark_to_base(processed, remaining, ctx, mark_coverage, base_coverage, mark_array, base_array),
            Subtable::MarkToLigature {
                mark_coverage,
                ligature_coverage,
                mark_array,
                ligature_array,
            } => process_mark_to_ligature(processed, remaining, ctx, mark_coverage, ligature_coverage, mark_array, ligature_array),
            Subtable::MarkToMark {
                mark1_coverage,
                mark2_coverage,
                mark1_array,
                mark2_array,
            } => process_mark_to_mark(processed, remaining, ctx, mark1_coverage, mark2_coverage, mark1_array, mark2_array),
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
        }
    }
}

fn head_eligible(remaining: &[GlyphRecord], flag: LookupFlag, gdef: Option<&Gdef>) -> bool {
    match remaining.first() {
        Some(record) => !flag.covers_glyph(&record.glyph_name, gdef),
        None => false,
    }
}

/// Finds the next record after `remaining[skip..]`'s start that the lookup
/// flag does not cover, mirroring `BaseSubTable._nextRecord`. Returns its
/// index within `remaining` (not relative to `skip`).
fn next_record(remaining: &[GlyphRecord], skip: usize, flag: LookupFlag, gdef: Option<&Gdef>) -> Option<usize> {
    remaining
        .iter()
        .enumerate()
        .skip(skip)
        .find(|(_, record)| !flag.covers_glyph(&record.glyph_name, gdef))
        .map(|(index, _)| index)
}

/// Finds the nearest preceding record in `processed` that the lookup flag
/// does not cover. `skip_marks` additionally excludes GDEF mark-class glyphs
/// (type 4/5's attachment search; type 6 does not exclude marks).
fn previous_record(processed: &[GlyphRecord], flag: LookupFlag, gdef: Option<&Gdef>, skip_marks: bool) -> Option<usize> {
    processed.iter().enumerate().rev().find(|(_, record)| {
        if flag.covers_glyph(&record.glyph_name, gdef) {
            return false;
        }
        if skip_marks {
            if let Some(gdef) = gdef {
                if gdef.glyph_class(&record.glyph_name) == glyph_class::MARK {
                    return false;
                }
            }
        }
        true
    }).map(|(index, _)| index)
}

fn process_single_format1(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    coverage: &Coverage,
    value: ValueRecord,
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    if !coverage.contains(&remaining[0].glyph_name) {
        return false;
    }
    remaining[0].apply_value_record(value);
    processed.push(remaining.remove(0));
    true
}

fn process_single_format2(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    coverage: &Coverage,
    values: &[ValueRecord],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let value = values[coverage.index(&head_name)];
    remaining[0].apply_value_record(value);
    processed.push(remaining.remove(0));
    true
}

fn process_pair_format1(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    coverage: &Coverage,
    value_format1: bool,
    value_format2: bool,
    pair_sets: &[Vec<PairValueRecord>],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let next_index = match next_record(remaining, 1, ctx.flag, ctx.gdef) {
        Some(index) => index,
        None => return false,
    };
    let next_name = remaining[next_index].glyph_name.clone();
    let pair_set = &pair_sets[coverage.index(&head_name)];

    for pair in pair_set {
        if pair.second_glyph != next_name {
            continue;
        }
        if value_format1 {
            remaining[0].apply_value_record(pair.value1);
        }
        if value_format2 {
            remaining[next_index].apply_value_record(pair.value2);
            let moved: Vec<GlyphRecord> = remaining.drain(0..=next_index).collect();
            processed.extend(moved);
        } else {
            processed.push(remaining.remove(0));
        }
        return true;
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn process_pair_format2(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    coverage: &Coverage,
    value_format1: bool,
    value_format2: bool,
    class_def1: &ClassDef,
    class_def2: &ClassDef,
    class1_records: &[Vec<Class2Record>],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let next_index = match next_record(remaining, 1, ctx.flag, ctx.gdef) {
        Some(index) => index,
        None => return false,
    };
    let next_name = remaining[next_index].glyph_name.clone();

    let class1 = class_def1.get(&head_name);
    let class2 = class_def2.get(&next_name);
    let record = match class1_records.get(class1 as usize).and_then(|row| row.get(class2 as usize)) {
        Some(record) => record.clone(),
        None => return false,
    };

    if value_format1 {
        remaining[0].apply_value_record(record.value1);
    }
    if value_format2 {
        remaining[next_index].apply_value_record(record.value2);
        let moved: Vec<GlyphRecord> = remaining.drain(0..=next_index).collect();
        processed.extend(moved);
    } else {
        processed.push(remaining.remove(0));
    }
    true
}

fn process_cursive(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    coverage: &Coverage,
    entry_exit_records: &[EntryExitRecord],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !coverage.contains(&head_name) {
        return false;
    }
    let next_index = match next_record(remaining, 1, ctx.flag, ctx.gdef) {
        Some(index) => index,
        None => return false,
    };
    let next_name = remaining[next_index].glyph_name.clone();
    if !coverage.contains(&next_name) {
        return false;
    }

    let exit_anchor = entry_exit_records[coverage.index(&head_name)].exit_anchor;
    let entry_anchor = entry_exit_records[coverage.index(&next_name)].entry_anchor;
    if let (Some(exit_anchor), Some(entry_anchor)) = (exit_anchor, entry_anchor) {
        let (dx, dy) = exit_anchor.difference(entry_anchor);
        remaining[next_index].x_placement += dx;
        remaining[next_index].y_placement += dy;
    }
    processed.push(remaining.remove(0));
    true
}

fn process_mark_to_base(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    mark_coverage: &Coverage,
    base_coverage: &Coverage,
    mark_array: &[MarkRecord],
    base_array: &[BaseRecord],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !mark_coverage.contains(&head_name) {
        return false;
    }
    let prev_index = match previous_record(processed, ctx.flag, ctx.gdef, true) {
        Some(index) => index,
        None => return false,
    };
    let prev_name = processed[prev_index].glyph_name.clone();
    if !base_coverage.contains(&prev_name) {
        return false;
    }

    let mark_record = mark_array[mark_coverage.index(&head_name)];
    let base_anchor = match base_array[base_coverage.index(&prev_name)].base_anchor.get(mark_record.class as usize) {
        Some(Some(anchor)) => *anchor,
        _ => return false,
    };
    let (dx, dy) = base_anchor.difference(mark_record.mark_anchor);
    remaining[0].x_placement += dx;
    remaining[0].y_placement += dy;
    processed.push(remaining.remove(0));
    true
}

fn process_mark_to_ligature(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    mark_coverage: &Coverage,
    ligature_coverage: &Coverage,
    mark_array: &[MarkRecord],
    ligature_array: &[LigatureAttach],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !mark_coverage.contains(&head_name) {
        return false;
    }
    let prev_index = match previous_record(processed, ctx.flag, ctx.gdef, true) {
        Some(index) => index,
        None => return false,
    };
    let prev_name = processed[prev_index].glyph_name.clone();
    if !ligature_coverage.contains(&prev_name) {
        return false;
    }

    let mark_record = mark_array[mark_coverage.index(&head_name)];
    let ligature_attach = &ligature_array[ligature_coverage.index(&prev_name)];
    // Component index within the ligature the mark attaches to. The original
    // leaves this undetermined ("XXX How is the component index determined?")
    // and always uses component 0; this engine makes the same choice.
    let component_record = match ligature_attach.component_record.first() {
        Some(record) => record,
        None => return false,
    };
    let ligature_anchor = match component_record.ligature_anchor.get(mark_record.class as usize) {
        Some(Some(anchor)) => *anchor,
        _ => return false,
    };
    let (dx, dy) = ligature_anchor.difference(mark_record.mark_anchor);
    remaining[0].x_placement += dx;
    remaining[0].y_placement += dy;
    processed.push(remaining.remove(0));
    true
}

fn process_mark_to_mark(
    processed: &mut Vec<GlyphRecord>,
    remaining: &mut Vec<GlyphRecord>,
    ctx: &mut GposContext,
    mark1_coverage: &Coverage,
    mark2_coverage: &Coverage,
    mark1_array: &[MarkRecord],
    mark2_array: &[Mark2Record],
) -> bool {
    if !head_eligible(remaining, ctx.flag, ctx.gdef) {
        return false;
    }
    let head_name = remaining[0].glyph_name.clone();
    if !mark1_coverage.contains(&head_name) {
        return false;
    }
    let prev_index = match previous_record(processed, ctx.flag, ctx.gdef, false) {
        Some(index) => index,
        None => return false,
    };
    let prev_name = processed[prev_index].glyph_name.clone();
    if !mark2_coverage.contains(&prev_name) {
        return false;
    }

    let mark1_record = mark1_array[mark1_coverage.index(&head_name)];
    let mark2_anchor = match mark2_array[mark2_coverage.index(&prev_name)].mark2_anchor.get(mark1_record.class as usize) {
        Some(Some(anchor)) => *anchor,
        _ => return false,
    };
    let (dx, dy) = mark2_anchor.difference(mark1_record.mark_anchor);
    remaining[0].x_placement += dx;
    remaining[0].y_placement += dy;
    processed.push(remaining.remove(0));
    true
}
