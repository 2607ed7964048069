use std::fmt;

use crate::tag::Tag;

/// Errors raised by the layout engine itself. Errors belonging to an external
/// collaborator (binary font parsing, name-table extraction) are not modeled here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No acceptable cmap subtable was supplied.
    CmapMissing,
    /// `get_feature_state` found different states for the same tag in GSUB and GPOS.
    FeatureStateInconsistent(Tag),
    /// `get_feature_state` was called for a tag present in neither table.
    FeatureAbsent(Tag),
    /// A special-casing context outside the supported set was encountered.
    UnimplementedCasingContext(&'static str),
    /// A referenced index was out of range, or a subtable format was unrecognized
    /// in a context where that cannot simply be treated as "no action".
    MalformedTable(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::CmapMissing => write!(f, "no acceptable cmap subtable found"),
            LayoutError::FeatureStateInconsistent(tag) => write!(
                f,
                "feature {} has inconsistent state between GSUB and GPOS",
                tag
            ),
            LayoutError::FeatureAbsent(tag) => {
                write!(f, "feature {} is not present in GSUB or GPOS", tag)
            }
            LayoutError::UnimplementedCasingContext(name) => {
                write!(f, "unimplemented special-casing context: {}", name)
            }
            LayoutError::MalformedTable(msg) => write!(f, "malformed table: {}", msg),
        }
    }
}

impl std::error::Error for LayoutError {}

pub type Result<T> = std::result::Result<T, LayoutError>;
