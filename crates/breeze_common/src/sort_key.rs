//! Total-order keys attached to every generated rule.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// A 128-bit composite ordering key for a generated CSS rule.
///
/// The low bits hold a per-rule sub-order, the middle bits hold one flag per
/// [`Layer`](crate::Layer), and the high bits hold one flag per variant. The
/// concrete bit layout is owned by [`LayerOrder`](crate::LayerOrder); this type
/// only provides ordering and flag arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SortKey(u128);

impl SortKey {
    /// The key with no bits set.
    pub const ZERO: SortKey = SortKey(0);

    /// Creates a key from its raw bit pattern.
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw bit pattern.
    pub fn as_raw(self) -> u128 {
        self.0
    }

    /// Returns a key with only bit `index` set, or `None` past bit 127.
    pub fn bit(index: u32) -> Option<Self> {
        1u128.checked_shl(index).map(Self)
    }

    /// Returns `true` if any bit set in `mask` is also set in `self`.
    pub fn intersects(self, mask: SortKey) -> bool {
        self.0 & mask.0 != 0
    }

    /// Compares two keys by the sign of their difference.
    pub fn compare(a: SortKey, b: SortKey) -> Ordering {
        a.0.cmp(&b.0)
    }
}

impl BitOr for SortKey {
    type Output = SortKey;

    fn bitor(self, rhs: SortKey) -> SortKey {
        SortKey(self.0 | rhs.0)
    }
}

impl BitAnd for SortKey {
    type Output = SortKey;

    fn bitand(self, rhs: SortKey) -> SortKey {
        SortKey(self.0 & rhs.0)
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SortKey({:#x})", self.0)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
