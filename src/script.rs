//! Script/language-system registry, grounded on
//! `original_source/Lib/compositor/scriptList.py`, plus an optional
//! script→text-direction convenience helper (see `DESIGN.md`).

use std::collections::HashMap;

use crate::tag::Tag;

/// A language system under a script; selects a subset of feature indices.
#[derive(Debug, Clone, Default)]
pub struct LangSys {
    /// Index into the table's `FeatureList`, if the script declares one
    /// required feature for this language system.
    pub required_feature_index: Option<u16>,
    pub feature_indices: Vec<u16>,
}

/// A script: a default language system plus any number of named ones.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub default_lang_sys: Option<LangSys>,
    pub lang_sys_records: HashMap<Tag, LangSys>,
}

/// `tag -> Script` registry, keyed by script tag (e.g. `latn`, `arab`, `DFLT`).
#[derive(Debug, Clone, Default)]
pub struct ScriptList {
    pub scripts: HashMap<Tag, Script>,
}

impl ScriptList {
    pub fn new(scripts: HashMap<Tag, Script>) -> ScriptList {
        ScriptList { scripts }
    }

    /// Resolves `(script, lang_sys)` to the `LangSys` to read feature indices
    /// from: falls back to the `DFLT` script if `script` is absent, and to
    /// the script's default lang-sys if `lang_sys` doesn't name one.
    pub fn resolve(&self, script: Tag, lang_sys: Option<Tag>) -> Option<&LangSys> {
        let script_table = self
            .scripts
            .get(&script)
            .or_else(|| self.scripts.get(&crate::tag::DFLT))?;

        if let Some(tag) = lang_sys {
            if let Some(lang_sys) = script_table.lang_sys_records.get(&tag) {
                return Some(lang_sys);
            }
        }
        script_table.default_lang_sys.as_ref()
    }
}

/// A rudimentary script→direction mapping. Not consulted by the engine
/// itself — processing treats `right_to_left` as a caller-supplied flag —
/// but offered as a convenience for callers building on [`crate::engine::Font`]
/// who want to default that flag from a script tag rather than deriving it
/// themselves. A real implementation should implement the Unicode bidi
/// algorithm; this mapping is intentionally partial.
pub mod direction {
    use crate::tag::Tag;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TextDirection {
        LeftToRight,
        RightToLeft,
    }

    mod rtl_tags {
        use super::Tag;
        use crate::tag;

        pub const ARAB: Tag = tag!(b"arab"); // Arabic
        pub const HEBR: Tag = tag!(b"hebr"); // Hebrew
        pub const SYRC: Tag = tag!(b"syrc"); // Syriac
        pub const THAA: Tag = tag!(b"thaa"); // Thaana
        pub const CPRT: Tag = tag!(b"cprt"); // Cypriot Syllabary
        pub const KHAR: Tag = tag!(b"khar"); // Kharosthi
        pub const PHNX: Tag = tag!(b"phnx"); // Phoenician
        pub const NKO: Tag = tag!(b"nko "); // N'Ko
        pub const LYDI: Tag = tag!(b"lydi"); // Lydian
        pub const AVST: Tag = tag!(b"avst"); // Avestan
        pub const ARMI: Tag = tag!(b"armi"); // Imperial Aramaic
        pub const PHLI: Tag = tag!(b"phli"); // Inscriptional Pahlavi
        pub const PRTI: Tag = tag!(b"prti"); // Inscriptional Parthian
        pub const SARB: Tag = tag!(b"sarb"); // Old South Arabian
        pub const ORKH: Tag = tag!(b"orkh"); // Old Turkic, Orkhon Runic
        pub const SAMR: Tag = tag!(b"samr"); // Samaritan
        pub const MAND: Tag = tag!(b"mand"); // Mandaic, Mandaean
        pub const MERC: Tag = tag!(b"merc"); // Meroitic Cursive
        pub const MERO: Tag = tag!(b"mero"); // Meroitic Hieroglyphs

        // Unicode 7.0 (not listed on http://www.microsoft.com/typography/otspec/scripttags.htm)
        pub const MANI: Tag = tag!(b"mani"); // Manichaean
        pub const MEND: Tag = tag!(b"mend"); // Mende Kikakui
        pub const NBAT: Tag = tag!(b"nbat"); // Nabataean
        pub const NARB: Tag = tag!(b"narb"); // Old North Arabian
        pub const PALM: Tag = tag!(b"palm"); // Palmyrene
        pub const PHLP: Tag = tag!(b"phlp"); // Psalter Pahlavi
    }

    /// Maps a script tag to its customary writing direction.
    pub fn direction(script: Tag) -> TextDirection {
        use rtl_tags as rtl;

        match script {
            rtl::ARAB
            | rtl::HEBR
            | rtl::SYRC
            | rtl::THAA
            | rtl::CPRT
            | rtl::KHAR
            | rtl::PHNX
            | rtl::NKO
            | rtl::LYDI
            | rtl::AVST
            | rtl::ARMI
            | rtl::PHLI
            | rtl::PRTI
            | rtl::SARB
            | rtl::ORKH
            | rtl::SAMR
            | rtl::MAND
            | rtl::MERC
            | rtl::MERO
            | rtl::MANI
            | rtl::MEND
            | rtl::NBAT
            | rtl::NARB
            | rtl::PALM
            | rtl::PHLP => TextDirection::RightToLeft,
            _ => TextDirection::LeftToRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;

    #[test]
    fn falls_back_to_dflt_script() {
        let mut scripts = HashMap::new();
        scripts.insert(
            tag::DFLT,
            Script {
                default_lang_sys: Some(LangSys {
                    required_feature_index: None,
                    feature_indices: vec![0, 1],
                }),
                lang_sys_records: HashMap::new(),
            },
        );
        let list = ScriptList::new(scripts);
        let resolved = list.resolve(tag!(b"latn"), None).unwrap();
        assert_eq!(resolved.feature_indices, vec![0, 1]);
    }

    #[test]
    fn rtl_direction_for_arabic() {
        assert_eq!(
            direction::direction(tag!(b"arab")),
            direction::TextDirection::RightToLeft
        );
        assert_eq!(
            direction::direction(tag!(b"latn")),
            direction::TextDirection::LeftToRight
        );
    }
}
