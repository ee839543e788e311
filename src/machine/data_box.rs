//! The unit of data moved through the machine.

use std::fmt;

/// A cell that is either empty or holds one integer.
///
/// Boxes are plain values: every operation returns a new box and leaves its
/// operands untouched, so a box can never be observed in two places at once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct DataBox(Option<i64>);

impl DataBox {
    /// An empty box.
    pub const EMPTY: DataBox = DataBox(None);

    /// A box holding `value`.
    pub const fn new(value: i64) -> Self {
        Self(Some(value))
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The held value, or `None` when empty.
    pub const fn value(&self) -> Option<i64> {
        self.0
    }

    /// True iff the box is non-empty and holds zero.
    pub fn is_zero(&self) -> bool {
        self.0 == Some(0)
    }

    /// Returns `src` itself; emptiness is taken over wholesale.
    pub fn copied_from(self, src: DataBox) -> DataBox {
        src
    }

    /// Adds `src` to this box.
    ///
    /// Emptiness comes from `src`, not from both operands: an empty receiver
    /// counts as zero, an empty source yields an empty box. Callers that need
    /// both operands present must check before calling.
    pub fn added(self, src: DataBox) -> DataBox {
        DataBox(src.0.map(|v| self.0.unwrap_or(0).wrapping_add(v)))
    }

    /// Subtracts `src` from this box, with the same emptiness rule as [`added`](Self::added).
    pub fn subtracted(self, src: DataBox) -> DataBox {
        DataBox(src.0.map(|v| self.0.unwrap_or(0).wrapping_sub(v)))
    }
}

impl From<i64> for DataBox {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DataBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "X"),
        }
    }
}
