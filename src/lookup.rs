//! Lookup flags and the lookup-flag filter, grounded on
//! `original_source/Lib/compositor/lookupList.py`'s `LookupFlag` class.

use crate::gdef::{glyph_class, Gdef};

const RIGHT_TO_LEFT: u16 = 0x0001;
const IGNORE_BASE_GLYPHS: u16 = 0x0002;
const IGNORE_LIGATURES: u16 = 0x0004;
const IGNORE_MARKS: u16 = 0x0008;
const MARK_ATTACHMENT_TYPE_MASK: u16 = 0xFF00;

/// Five independent predicates derived from a 16-bit lookup flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupFlag(pub u16);

impl LookupFlag {
    pub fn right_to_left(self) -> bool {
        self.0 & RIGHT_TO_LEFT != 0
    }

    pub fn ignore_base_glyphs(self) -> bool {
        self.0 & IGNORE_BASE_GLYPHS != 0
    }

    pub fn ignore_ligatures(self) -> bool {
        self.0 & IGNORE_LIGATURES != 0
    }

    pub fn ignore_marks(self) -> bool {
        self.0 & IGNORE_MARKS != 0
    }

    pub fn mark_attachment_class(self) -> u8 {
        ((self.0 & MARK_ATTACHMENT_TYPE_MASK) >> 8) as u8
    }

    /// Decides whether `glyph` is skipped — invisible to this lookup's
    /// matching but still carried through the stream unchanged.
    pub fn covers_glyph(self, glyph: &str, gdef: Option<&Gdef>) -> bool {
        let gdef = match gdef {
            Some(gdef) => gdef,
            None => return false,
        };
        let class = gdef.glyph_class(glyph);
        if class == 0 {
            return false;
        }
        if self.ignore_base_glyphs() && class == glyph_class::BASE {
            return true;
        }
        if self.ignore_ligatures() && class == glyph_class::LIGATURE {
            return true;
        }
        if self.ignore_marks() && class == glyph_class::MARK {
            return true;
        }
        let mark_attachment_class = self.mark_attachment_class();
        if mark_attachment_class != 0 && class == glyph_class::MARK {
            return match &gdef.mark_attach_class_def {
                None => false,
                Some(mark_attach_class_def) => {
                    mark_attach_class_def.get(glyph) as u8 != mark_attachment_class
                }
            };
        }
        false
    }
}

/// A group of subtables sharing one type and flag; the atomic unit of feature
/// application. `T` is the subtable variant type (`gsub::Subtable` or
/// `gpos::Subtable`).
#[derive(Debug, Clone)]
pub struct Lookup<T> {
    pub flag: LookupFlag,
    pub subtables: Vec<T>,
}

impl<T> Lookup<T> {
    pub fn new(flag: LookupFlag, subtables: Vec<T>) -> Lookup<T> {
        assert!(!subtables.is_empty(), "a lookup must have at least one subtable");
        Lookup { flag, subtables }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_def::ClassDef;
    use std::collections::HashMap;

    fn gdef_with_classes(pairs: &[(&str, u16)]) -> Gdef {
        let mut map = HashMap::new();
        for (glyph, class) in pairs {
            map.insert(glyph.to_string(), *class);
        }
        Gdef::new(Some(ClassDef::new(map)), None)
    }

    #[test]
    fn no_gdef_never_covers() {
        let flag = LookupFlag(IGNORE_MARKS);
        assert!(!flag.covers_glyph("mark1", None));
    }

    #[test]
    fn ignore_marks_covers_mark_class_glyphs() {
        let gdef = gdef_with_classes(&[("mark1", glyph_class::MARK), ("base1", glyph_class::BASE)]);
        let flag = LookupFlag(IGNORE_MARKS);
        assert!(flag.covers_glyph("mark1", Some(&gdef)));
        assert!(!flag.covers_glyph("base1", Some(&gdef)));
    }

    #[test]
    fn mark_attachment_class_covers_mismatched_marks() {
        let mut gdef = gdef_with_classes(&[("mark1", glyph_class::MARK)]);
        let mut attach = HashMap::new();
        attach.insert("mark1".to_string(), 2u16);
        gdef.mark_attach_class_def = Some(ClassDef::new(attach));

        let flag = LookupFlag(1u16 << 8); // mark_attachment_class == 1
        assert!(flag.covers_glyph("mark1", Some(&gdef)));
    }
}
