//! Feature registry, grounded on
//! `original_source/Lib/compositor/featureList.py` and the `defaultOnFeatures`
//! closed list in `original_source/Lib/compositor/tables.py`.

use crate::tag::Tag;

/// One entry of a `FeatureList`: a 4-character tag and the lookups it selects.
#[derive(Debug, Clone)]
pub struct Feature {
    pub tag: Tag,
    pub lookup_indices: Vec<u16>,
}

/// Indexed, insertion-ordered feature records.
#[derive(Debug, Clone, Default)]
pub struct FeatureList {
    pub features: Vec<Feature>,
}

impl FeatureList {
    pub fn new(features: Vec<Feature>) -> FeatureList {
        FeatureList { features }
    }

    pub fn get(&self, index: u16) -> Option<&Feature> {
        self.features.get(index as usize)
    }
}

/// The closed set of GSUB feature tags that default to "on".
pub const GSUB_DEFAULT_ON: &[&[u8; 4]] = &[
    b"calt", b"ccmp", b"clig", b"fina", b"half", b"init", b"isol", b"liga", b"locl", b"med2",
    b"medi", b"nukt", b"pref", b"pres", b"pstf", b"psts", b"rand", b"rlig", b"rphf", b"tjmo",
    b"vatu", b"vjmo",
];

/// The closed set of GPOS feature tags that default to "on".
pub const GPOS_DEFAULT_ON: &[&[u8; 4]] = &[
    b"abvm", b"blwm", b"kern", b"mark", b"mkmk", b"opbd", b"vkrn",
];

/// Feature tags that are boundary-sensitive to word position:
/// Arabic-style joining forms that only fire at the appropriate edge of a word.
pub const BOUNDARY_SENSITIVE: &[&[u8; 4]] = &[b"init", b"medi", b"fina", b"isol"];

/// Tag used to mark accumulate-only "all alternates" discovery; replayed
/// last by the stream processor, after every other feature has run.
pub const AALT: Tag = crate::tag!(b"aalt");

/// Tag used by GSUB type 3 (alternate substitution) to select a
/// pseudo-random alternate instead of publishing the whole alternate set.
pub const RAND: Tag = crate::tag!(b"rand");

pub fn default_on_tags(tags: &[&[u8; 4]]) -> Vec<Tag> {
    tags.iter().map(|bytes| Tag::from_bytes(bytes)).collect()
}

pub fn is_boundary_sensitive(tag: Tag) -> bool {
    BOUNDARY_SENSITIVE
        .iter()
        .any(|bytes| Tag::from_bytes(bytes) == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aalt_and_rand_are_well_formed_tags() {
        assert_eq!(AALT.as_str(), "aalt");
        assert_eq!(RAND.as_str(), "rand");
    }

    #[test]
    fn boundary_sensitive_set_matches_spec() {
        assert!(is_boundary_sensitive(crate::tag!(b"init")));
        assert!(is_boundary_sensitive(crate::tag!(b"fina")));
        assert!(!is_boundary_sensitive(crate::tag!(b"liga")));
    }
}
