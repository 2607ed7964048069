//! GPOS displacement (`ValueRecord`) and attachment-point (`Anchor`) data.

/// A four-field adjustment applied to a glyph record's placement/advance.
/// Device-adjustment subfields are not modeled (spec Non-goals: no Device tables).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRecord {
    pub x_placement: i32,
    pub y_placement: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

impl ValueRecord {
    pub const ZERO: ValueRecord = ValueRecord {
        x_placement: 0,
        y_placement: 0,
        x_advance: 0,
        y_advance: 0,
    };

    pub fn new(x_placement: i32, y_placement: i32, x_advance: i32, y_advance: i32) -> ValueRecord {
        ValueRecord {
            x_placement,
            y_placement,
            x_advance,
            y_advance,
        }
    }
}

impl std::ops::Add for ValueRecord {
    type Output = ValueRecord;

    fn add(self, rhs: ValueRecord) -> ValueRecord {
        ValueRecord {
            x_placement: self.x_placement + rhs.x_placement,
            y_placement: self.y_placement + rhs.y_placement,
            x_advance: self.x_advance + rhs.x_advance,
            y_advance: self.y_advance + rhs.y_advance,
        }
    }
}

impl std::ops::AddAssign for ValueRecord {
    fn add_assign(&mut self, rhs: ValueRecord) {
        *self = *self + rhs;
    }
}

/// An (x, y) attachment point on a glyph, in font units.
///
/// Format 2 anchors additionally carry a contour-point index identifying the
/// point on the outline to attach to; this engine does not resolve outlines
/// (spec Non-goals) and treats format 2 identically to format 1, using the
/// coordinates verbatim. This is an explicit open-question resolution, not an
/// oversight: the original source leaves contour-point anchor resolution
/// unimplemented too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub fn new(x: i32, y: i32) -> Anchor {
        Anchor { x, y }
    }

    /// `self - other`, mirroring the original's `_calculateAnchorDifference(anchor1,
    /// anchor2)`. GPOS types 3-6 each call this as `target.difference(attaching)`
    /// and apply the result onto the attaching glyph's placement, e.g. cursive
    /// attachment computes `exit_anchor.difference(entry_anchor)` and adds it to
    /// the following glyph.
    pub fn difference(self, other: Anchor) -> (i32, i32) {
        (self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_record_addition_is_componentwise() {
        let a = ValueRecord::new(1, 2, 3, 4);
        let b = ValueRecord::new(10, 20, 30, 40);
        assert_eq!(a + b, ValueRecord::new(11, 22, 33, 44));
    }

    #[test]
    fn anchor_difference() {
        let exit = Anchor::new(100, 10);
        let entry = Anchor::new(0, 0);
        assert_eq!(exit.difference(entry), (100, 10));
    }
}
