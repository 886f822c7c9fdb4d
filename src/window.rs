//! Local functions of windows of an AIG.
//!
//! A window is given by its leaves: the truth tables of the nodes above the leaves are
//! computed with one variable per leaf. The care set of a set of leaves is the set of leaf
//! assignments that can actually occur, estimated by simulating a larger window below.

use std::collections::{HashMap, HashSet};

use crate::{
    Aig, NodeId, Signal,
    dfs::{cone, expand_cut},
    truth_table::TruthTable,
};

/// Above this number of window inputs, the care set is not computed.
pub const MAX_WINDOW_INPUTS: usize = 16;

/// Truth tables over `leaves` (variable `i` is `leaves[i]`) of the leaves and of `nodes`.
///
/// `nodes` must be in topological order and contained in the cone above the leaves.
/// The constant node is always included.
pub fn simulate_window(aig: &Aig, leaves: &[NodeId], nodes: &[NodeId]) -> HashMap<NodeId, TruthTable> {
    let num_vars = leaves.len();
    let mut values = HashMap::with_capacity(leaves.len() + nodes.len() + 1);
    values.insert(0, TruthTable::const0(num_vars));
    for (var, &leaf) in leaves.iter().enumerate() {
        values.insert(leaf, TruthTable::nth_var(num_vars, var));
    }
    for &node in nodes {
        if values.contains_key(&node) {
            continue;
        }
        let tt = match aig.fanins(node) {
            [a, b] => signal_table(&values, *a, num_vars) & signal_table(&values, *b, num_vars),
            _ => TruthTable::const0(num_vars),
        };
        values.insert(node, tt);
    }
    values
}

/// Table of a signal, complement applied. Unknown nodes read as const0.
pub fn signal_table(values: &HashMap<NodeId, TruthTable>, signal: Signal, num_vars: usize) -> TruthTable {
    let tt = values
        .get(&signal.node())
        .cloned()
        .unwrap_or_else(|| TruthTable::const0(num_vars));
    if signal.is_complemented() { !tt } else { tt }
}

/// Function of `root` over `leaves`.
pub fn cone_function(aig: &Aig, root: NodeId, leaves: &[NodeId]) -> TruthTable {
    let nodes = cone(aig, root, leaves);
    let values = simulate_window(aig, leaves, &nodes);
    signal_table(&values, Signal::from_node(root), leaves.len())
}

/// Leaf assignments reachable from a window of at most `window_size` inputs below
/// `leaves`. Unreachable assignments are satisfiability don't-cares.
///
/// The result is sound: an assignment is only excluded when no window input assignment
/// produces it. When the window cannot be simulated, every assignment is a care.
pub fn care_set(aig: &Aig, leaves: &[NodeId], window_size: usize) -> TruthTable {
    let num_vars = leaves.len();
    let window = expand_cut(aig, leaves, HashSet::new(), window_size.min(MAX_WINDOW_INPUTS));
    if window.len() > MAX_WINDOW_INPUTS {
        return TruthTable::const1(num_vars);
    }

    let leaf_set: HashSet<NodeId> = window.iter().copied().collect();
    let mut nodes: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    for &leaf in leaves {
        for node in cone(aig, leaf, &window) {
            if !leaf_set.contains(&node) && seen.insert(node) {
                nodes.push(node);
            }
        }
    }
    let values = simulate_window(aig, &window, &nodes);

    let mut care = TruthTable::const0(num_vars);
    let tables: Vec<TruthTable> = leaves
        .iter()
        .map(|&l| signal_table(&values, Signal::from_node(l), window.len()))
        .collect();
    for minterm in 0..1usize << window.len() {
        let mut assignment = 0;
        for (var, tt) in tables.iter().enumerate() {
            if tt.get_bit(minterm) {
                assignment |= 1 << var;
            }
        }
        care.set_bit(assignment);
    }
    care
}
