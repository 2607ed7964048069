//! Glyph definition table, grounded on `original_source/Lib/compositor/tables.py`'s
//! `GDEF` class.

use crate::class_def::{GlyphClassDef, MarkAttachClassDef};

/// Glyph class values used by `GlyphClassDef`.
pub mod glyph_class {
    pub const BASE: u16 = 1;
    pub const LIGATURE: u16 = 2;
    pub const MARK: u16 = 3;
    pub const COMPONENT: u16 = 4;
}

/// Optional glyph-definition data. The original source additionally recognizes
/// `AttachList` and `LigCaretList` sub-structures and raises `NotImplementedError`
/// the moment either is present, rather than modeling them; this type has no
/// fields for either for the same reason — a caller-side table
/// loader that encounters them should surface `LayoutError::MalformedTable`
/// before constructing a `Gdef`.
#[derive(Debug, Clone, Default)]
pub struct Gdef {
    pub glyph_class_def: Option<GlyphClassDef>,
    pub mark_attach_class_def: Option<MarkAttachClassDef>,
}

impl Gdef {
    pub fn new(
        glyph_class_def: Option<GlyphClassDef>,
        mark_attach_class_def: Option<MarkAttachClassDef>,
    ) -> Gdef {
        Gdef {
            glyph_class_def,
            mark_attach_class_def,
        }
    }

    pub fn glyph_class(&self, glyph: &str) -> u16 {
        self.glyph_class_def
            .as_ref()
            .map(|cd| cd.get(glyph))
            .unwrap_or(0)
    }

    pub fn is_mark(&self, glyph: &str) -> bool {
        self.glyph_class(glyph) == glyph_class::MARK
    }
}
