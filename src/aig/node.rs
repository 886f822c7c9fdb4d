use super::Signal;

/// A node id.
///
/// The constant node [`AigNode::Constant`] has id 0 by convention. Ids index the node arena of an [`Aig`].
///
/// [`Aig`]: crate::Aig
pub type NodeId = usize;

/// An AIG node.
///
/// Fanouts are not stored in the node: the [`Aig`] keeps them in a side table so that
/// nodes never own references to each other.
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AigNode {
    /// The constant low/false signal.
    Constant,
    /// A primary input, with its position among primary inputs.
    Pi(usize),
    /// A register output (for sequential circuits), with its register index.
    Ro(usize),
    /// An AND gate with two fanins, ordered by literal.
    And([Signal; 2]),
}

impl AigNode {
    pub fn is_constant(&self) -> bool {
        matches!(self, AigNode::Constant)
    }

    pub fn is_pi(&self) -> bool {
        matches!(self, AigNode::Pi(_))
    }

    pub fn is_ro(&self) -> bool {
        matches!(self, AigNode::Ro(_))
    }

    /// Combinational input: either a primary input or a register output.
    pub fn is_ci(&self) -> bool {
        matches!(self, AigNode::Pi(_) | AigNode::Ro(_))
    }

    pub fn is_and(&self) -> bool {
        matches!(self, AigNode::And(_))
    }

    /// Returns the fanins of the node (empty for constant and inputs).
    pub fn fanins(&self) -> &[Signal] {
        match self {
            AigNode::And(fanins) => fanins,
            _ => &[],
        }
    }
}
