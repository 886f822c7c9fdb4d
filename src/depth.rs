//! Levels of the nodes of an AIG.

use crate::{Aig, NodeId, simulation::evaluation_order};

/// Levels computed once from an AIG: combinational inputs and the constant are at level 0,
/// a gate is one level above its deepest fanin.
///
/// The view does not borrow the AIG, call [`DepthView::update_levels`] after mutations.
///
/// ```rust
/// use aigsynth::{Aig, depth::DepthView};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let c = aig.create_pi();
/// let ab = aig.create_and(a, b);
/// let f = aig.create_and(ab, c);
/// aig.create_po(f);
/// let depth = DepthView::new(&aig);
/// assert_eq!(depth.num_levels(), 2);
/// assert!(depth.is_on_critical_path(a.node()));
/// assert!(!depth.is_on_critical_path(c.node()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DepthView {
    levels: Vec<u32>,
    critical: Vec<bool>,
    depth: u32,
}

impl DepthView {
    pub fn new(aig: &Aig) -> Self {
        let mut view = DepthView::default();
        view.update_levels(aig);
        view
    }

    /// Recomputes every level and the critical path.
    pub fn update_levels(&mut self, aig: &Aig) {
        let order = evaluation_order(aig);
        self.levels = vec![0; aig.size()];
        for &gate in &order {
            self.levels[gate] = 1 + aig
                .fanins(gate)
                .iter()
                .map(|f| self.levels[f.node()])
                .max()
                .unwrap_or(0);
        }
        self.depth = aig.cos().map(|co| self.levels[co.node()]).max().unwrap_or(0);

        self.critical = vec![false; aig.size()];
        for co in aig.cos() {
            if self.levels[co.node()] == self.depth {
                self.critical[co.node()] = true;
            }
        }
        for &gate in order.iter().rev() {
            if !self.critical[gate] {
                continue;
            }
            for fanin in aig.fanins(gate) {
                if self.levels[fanin.node()] + 1 == self.levels[gate] {
                    self.critical[fanin.node()] = true;
                }
            }
        }
    }

    /// Level of a node (0 for unknown nodes).
    pub fn level(&self, node: NodeId) -> u32 {
        self.levels.get(node).copied().unwrap_or(0)
    }

    /// Largest level over the combinational outputs.
    pub fn num_levels(&self) -> u32 {
        self.depth
    }

    /// True iff the node lies on a longest path to a combinational output.
    pub fn is_on_critical_path(&self, node: NodeId) -> bool {
        self.critical.get(node).copied().unwrap_or(false)
    }
}
