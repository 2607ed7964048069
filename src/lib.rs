//! An OpenType layout engine: given a pre-parsed font-table view (cmap,
//! optional GDEF, optional GSUB/GPOS) and a glyph or text input, applies
//! substitution and positioning features to produce a positioned glyph-record
//! stream. See `DESIGN.md` for how each module's behavior was derived.

pub mod class_def;
pub mod cmap;
mod contextual;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod feature;
pub mod gdef;
pub mod glyph_record;
pub mod gpos;
pub mod gsub;
pub mod logger;
pub mod lookup;
pub mod random;
pub mod script;
pub mod table;
pub mod tag;
pub mod unicode;
pub mod value;

pub use engine::{Font, Input, LayoutEngine, ProcessOptions};
pub use error::{LayoutError, Result};
