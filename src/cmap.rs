//! Unicode ↔ glyph-name mapping, grounded on
//! `original_source/Lib/compositor/cmap.py`'s `extractCMAP`/`reverseCMAP`, and
//! on the platform/encoding preference order documented below and in
//! `DESIGN.md`.

use std::collections::HashMap;

/// A caller-supplied Unicode → glyph-name mapping, for "the best available
/// platform/encoding pair", preferring (3,10), then (0,3), then
/// (3,1). Since this crate does not parse a binary cmap subtable, that
/// preference is a contract on how the caller builds this value rather than
/// logic this type executes.
#[derive(Debug, Clone, Default)]
pub struct Cmap {
    forward: HashMap<char, String>,
}

impl Cmap {
    pub fn new(forward: HashMap<char, String>) -> Cmap {
        Cmap { forward }
    }

    pub fn glyph_for_char(&self, ch: char) -> Option<&str> {
        self.forward.get(&ch).map(String::as_str)
    }

    /// Derives the reverse mapping, mirroring `original_source`'s
    /// `reverseCMAP`, which a font builds once rather than per lookup. On a
    /// collision (two code points mapping to the same glyph) the first one
    /// encountered during iteration wins, matching a plain dict-overwrite
    /// walk over an unordered mapping.
    pub fn reverse(&self) -> ReverseCmap {
        let mut by_glyph = HashMap::with_capacity(self.forward.len());
        for (ch, name) in &self.forward {
            by_glyph.entry(name.clone()).or_insert(*ch);
        }
        ReverseCmap { by_glyph }
    }
}

/// The inverse of a [`Cmap`]: glyph name → Unicode code point. This is the
/// primitive the side-1/side-2 helpers and case conversion need.
#[derive(Debug, Clone, Default)]
pub struct ReverseCmap {
    by_glyph: HashMap<String, char>,
}

impl ReverseCmap {
    pub fn unicode_for_glyph(&self, glyph: &str) -> Option<char> {
        self.by_glyph.get(glyph).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_cmap_maps_glyph_back_to_code_point() {
        let mut forward = HashMap::new();
        forward.insert('a', "a".to_string());
        forward.insert('b', "b".to_string());
        let cmap = Cmap::new(forward);
        let reverse = cmap.reverse();
        assert_eq!(reverse.unicode_for_glyph("a"), Some('a'));
        assert_eq!(reverse.unicode_for_glyph("z"), None);
    }
}
