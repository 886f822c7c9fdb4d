//! A [`Signal`] points at a node of an [`Aig`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`Aig`]: crate::Aig

use std::{
    fmt,
    ops::{BitXor, Not},
};

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A directed edge of the AIG, packed as a literal `2 * node + complement`.
///
/// Ordering follows the literal, so signals on the constant node sort before all others
/// and the two polarities of a node are adjacent.
///
/// ```rust
/// use aigsynth::Signal;
/// let s = Signal::new(3, false);
/// assert_eq!(!!s, s);
/// assert_ne!(!s, s);
/// assert_eq!(s.literal(), 6);
/// assert_eq!((!s).literal(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Signal(usize);

impl Signal {
    /// The constant false signal.
    pub const FALSE: Signal = Signal(0);
    /// The constant true signal.
    pub const TRUE: Signal = Signal(1);

    pub const fn new(node: NodeId, complement: bool) -> Self {
        Signal((node << 1) | complement as usize)
    }

    /// The non-complemented signal of `node`.
    pub const fn from_node(node: NodeId) -> Self {
        Signal(node << 1)
    }

    pub const fn from_literal(literal: usize) -> Self {
        Signal(literal)
    }

    pub const fn node(self) -> NodeId {
        self.0 >> 1
    }

    pub const fn is_complemented(self) -> bool {
        self.0 & 1 == 1
    }

    pub const fn literal(self) -> usize {
        self.0
    }

    /// Strips the complement bit.
    pub const fn positive(self) -> Self {
        Signal(self.0 & !1)
    }

    pub const fn is_constant(self) -> bool {
        self.node() == 0
    }

    pub fn is_complement_of(self, other: Signal) -> bool {
        self.0 ^ other.0 == 1
    }
}

impl Not for Signal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Signal(self.0 ^ 1)
    }
}

/// Conditional complement: `s ^ true == !s`.
impl BitXor<bool> for Signal {
    type Output = Self;

    fn bitxor(self, rhs: bool) -> Self::Output {
        Signal(self.0 ^ rhs as usize)
    }
}

impl From<NodeId> for Signal {
    fn from(value: NodeId) -> Self {
        Signal::from_node(value)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complemented() {
            write!(f, "!{}", self.node())
        } else {
            write!(f, "{}", self.node())
        }
    }
}
