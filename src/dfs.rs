//! Traversals of an AIG: DFS visitor, topological orders, cones, maximum fanout-free cones
//! and reconvergence-driven cuts.
//!
//! Creation order is topological as long as no substitution happened, so every pass that
//! runs after a substitution goes through [`topological_order`] instead of [`Aig::gates`].

use std::collections::{HashMap, HashSet};

use crate::{Aig, AigError, NodeId, Result};

/// A simple DFS visitor.
///
/// Nodes are yielded in preorder. You can:
/// - start a DFS from a node using [`from_node`]
/// - or visit all the AIG by starting from the outputs using [`from_outputs`].
///
/// In the latter case, it will start by the fanin of the last output,
/// then explore all non-previously-explored nodes from the fanin of the previous output,
/// and so on until all the outputs have been processed.
///
/// [`from_node`]: Dfs::from_node
/// [`from_outputs`]: Dfs::from_outputs
///
/// ```rust
/// use aigsynth::{Aig, dfs::Dfs};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let f = aig.create_and(a, b);
/// aig.create_po(f);
/// let mut dfs = Dfs::from_outputs(&aig);
/// let mut count = 0;
/// while let Some(_) = dfs.next(&aig) {
///     // You can still borrow mut aig here
///     count += 1;
/// }
/// assert_eq!(count, 3);
/// ```
pub struct Dfs {
    /// Must maintain the following invariant:
    /// - all nodes on the stack have not been visited yet
    /// - their `seen` flag is set to true to avoid adding them one more time to the stack
    /// - the different outputs from which to start a DFS are in starts
    stack: Vec<NodeId>,
    seen: HashSet<NodeId>,
    starts: Vec<NodeId>,
}

impl Dfs {
    /// Create a DFS from the initial start node.
    /// You will only browse the fanin of this node.
    pub fn from_node(start: NodeId) -> Self {
        Dfs {
            stack: vec![start],
            seen: HashSet::from([start]),
            starts: Vec::new(),
        }
    }

    /// Create a DFS from the combinational outputs of the given AIG.
    pub fn from_outputs(aig: &Aig) -> Self {
        let mut ids: Vec<NodeId> = aig.cos().map(|s| s.node()).collect();
        match ids.pop() {
            None => Dfs {
                stack: Vec::new(),
                seen: HashSet::new(),
                starts: Vec::new(),
            },
            Some(start) => Dfs {
                stack: vec![start],
                seen: HashSet::from([start]),
                starts: ids,
            },
        }
    }

    /// Returns true if we are ready to start again, false if we are done.
    fn new_start(&mut self) -> bool {
        while let Some(id) = self.starts.pop() {
            if self.seen.insert(id) {
                self.stack.push(id);
                return true;
            }
        }
        false
    }

    /// Yield the next node of the DFS, or None if it is done.
    pub fn next(&mut self, aig: &Aig) -> Option<NodeId> {
        loop {
            if let Some(id) = self.stack.pop() {
                for child in aig.fanins(id) {
                    if self.seen.insert(child.node()) {
                        self.stack.push(child.node());
                    }
                }
                return Some(id);
            }
            // Maybe we can start from a different output?
            if !self.new_start() {
                return None;
            }
        }
    }
}

/// Post-order visit of the gates in the fanin of `roots`, stopping at `leaves` and inputs.
///
/// Returns an error if a combinational cycle is found.
fn post_order(
    aig: &Aig,
    roots: impl IntoIterator<Item = NodeId>,
    leaves: &HashSet<NodeId>,
) -> Result<Vec<NodeId>> {
    let mut order = Vec::new();
    let mut done = HashSet::new();
    let mut on_path = HashSet::new();
    for root in roots {
        if done.contains(&root) || leaves.contains(&root) || !aig.is_and(root) {
            continue;
        }
        // (node, children already pushed)
        let mut stack = vec![(root, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                on_path.remove(&node);
                if done.insert(node) {
                    order.push(node);
                }
                continue;
            }
            if done.contains(&node) {
                continue;
            }
            if !on_path.insert(node) {
                return Err(AigError::InvalidState(format!(
                    "combinational cycle through node {node}"
                )));
            }
            stack.push((node, true));
            for fanin in aig.fanins(node).iter().rev() {
                let child = fanin.node();
                if aig.is_and(child) && !leaves.contains(&child) && !done.contains(&child) {
                    if on_path.contains(&child) {
                        return Err(AigError::InvalidState(format!(
                            "combinational cycle through node {child}"
                        )));
                    }
                    stack.push((child, false));
                }
            }
        }
    }
    Ok(order)
}

/// Live gates reachable from the combinational outputs, in topological order.
pub fn topological_order(aig: &Aig) -> Result<Vec<NodeId>> {
    post_order(aig, aig.cos().map(|s| s.node()), &HashSet::new())
}

/// Every live gate (dangling ones included) in topological order.
pub fn all_gates_topological(aig: &Aig) -> Result<Vec<NodeId>> {
    post_order(aig, aig.gates(), &HashSet::new())
}

/// Gates of the cone of `root` bounded by `leaves`, in topological order (root last).
pub fn cone(aig: &Aig, root: NodeId, leaves: &[NodeId]) -> Vec<NodeId> {
    let leaves: HashSet<NodeId> = leaves.iter().copied().collect();
    // the AIG is acyclic, post_order can only fail on a cycle
    post_order(aig, [root], &leaves).unwrap_or_default()
}

/// Maximum fanout-free cone of `root`: the gates that become unreferenced if `root` is
/// removed, stopping at `leaves` and inputs. The root is included (if it is a gate).
pub fn mffc(aig: &Aig, root: NodeId, leaves: &[NodeId]) -> Vec<NodeId> {
    if !aig.is_and(root) {
        return Vec::new();
    }
    let leaves: HashSet<NodeId> = leaves.iter().copied().collect();
    let mut released: HashMap<NodeId, usize> = HashMap::new();
    let mut result = vec![root];
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for fanin in aig.fanins(node) {
            let child = fanin.node();
            if leaves.contains(&child) || !aig.is_and(child) {
                continue;
            }
            let count = released.entry(child).or_insert(0);
            *count += 1;
            if *count == aig.fanout_size(child) {
                result.push(child);
                stack.push(child);
            }
        }
    }
    result
}

/// Reconvergence-driven cut of `root` with at most `max_leaves` leaves.
///
/// Starting from the fanins of the root, the leaf whose expansion adds the fewest new
/// leaves is repeatedly replaced by its fanins. Inputs are never expanded. Leaves are
/// returned sorted.
pub fn reconvergence_cut(aig: &Aig, root: NodeId, max_leaves: usize) -> Vec<NodeId> {
    if !aig.is_and(root) {
        return vec![root];
    }
    let start: Vec<NodeId> = aig.fanins(root).iter().map(|f| f.node()).collect();
    expand_cut(aig, &start, HashSet::from([root]), max_leaves)
}

/// Expands the cut `start` towards the inputs while it has at most `max_leaves` leaves,
/// always expanding the leaf that adds the fewest new leaves. Nodes in `visited` are
/// inside the cone already. Leaves are returned sorted.
pub fn expand_cut(
    aig: &Aig,
    start: &[NodeId],
    mut visited: HashSet<NodeId>,
    max_leaves: usize,
) -> Vec<NodeId> {
    let mut leaves: Vec<NodeId> = Vec::new();
    for &node in start {
        if visited.insert(node) {
            leaves.push(node);
        }
    }

    loop {
        let mut best: Option<(usize, usize)> = None;
        for (position, &leaf) in leaves.iter().enumerate() {
            if !aig.is_and(leaf) {
                continue;
            }
            let cost = aig
                .fanins(leaf)
                .iter()
                .filter(|f| !visited.contains(&f.node()))
                .count();
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((position, cost));
            }
        }
        let Some((position, cost)) = best else {
            break;
        };
        if leaves.len() - 1 + cost > max_leaves {
            break;
        }
        let leaf = leaves.swap_remove(position);
        for fanin in aig.fanins(leaf) {
            if visited.insert(fanin.node()) {
                leaves.push(fanin.node());
            }
        }
    }
    leaves.sort_unstable();
    leaves
}
