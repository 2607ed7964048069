//! 4-character OpenType tags (script, language-system, and feature tags), packed
//! into a `u32` with a small macro for building one from a byte-string literal.

use std::fmt;

/// A 4-byte OpenType tag, e.g. `liga`, `latn`, `DFLT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    pub const fn from_bytes(bytes: &[u8; 4]) -> Tag {
        Tag(((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32))
    }

    pub fn as_bytes(self) -> [u8; 4] {
        [
            (self.0 >> 24) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        ]
    }

    pub fn as_str(self) -> String {
        String::from_utf8_lossy(&self.as_bytes()).into_owned()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

/// Builds a [`Tag`] from a 4-byte string literal, e.g. `tag!(b"liga")`.
#[macro_export]
macro_rules! tag {
    ($bytes:expr) => {
        $crate::tag::Tag::from_bytes($bytes)
    };
}

pub const DFLT: Tag = tag!(b"DFLT");
pub const LATN: Tag = tag!(b"latn");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let t = tag!(b"liga");
        assert_eq!(t.as_str(), "liga");
        assert_eq!(format!("{}", t), "liga");
    }

    #[test]
    fn ordering_matches_byte_order() {
        assert!(tag!(b"AAAA") < tag!(b"AAAB"));
    }
}
