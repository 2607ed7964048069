//! Glyph→class membership, grounded on
//! `original_source/Lib/compositor/classDefinitionTables.py`.

use std::collections::HashMap;

/// A mapping from glyph name to non-negative integer class. Glyphs not present
/// implicitly map to class 0 — this is required by the OpenType spec and is
/// exploited by chaining-contextual format 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDef {
    classes: HashMap<String, u16>,
}

impl ClassDef {
    pub fn new(classes: HashMap<String, u16>) -> ClassDef {
        ClassDef { classes }
    }

    pub fn get(&self, glyph: &str) -> u16 {
        self.classes.get(glyph).copied().unwrap_or(0)
    }
}

/// `GDEF.GlyphClassDef`: class 1 = base, 2 = ligature, 3 = mark, 4 = component.
pub type GlyphClassDef = ClassDef;

/// `GDEF.MarkAttachClassDef`.
pub type MarkAttachClassDef = ClassDef;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_glyph_is_class_zero() {
        let mut map = HashMap::new();
        map.insert("A".to_string(), 1u16);
        let cd = ClassDef::new(map);
        assert_eq!(cd.get("A"), 1);
        assert_eq!(cd.get("unlisted"), 0);
    }
}
