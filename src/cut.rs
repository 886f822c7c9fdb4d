//! Enumeration of k-feasible cuts, with the truth table of every cut.
//!
//! A cut of a node is a set of leaves such that every path from a combinational input to
//! the node goes through a leaf. Cuts of a gate are merged from the cuts of its fanins,
//! dominated cuts are dropped and the best `cut_limit` cuts are kept, plus the trivial cut
//! made of the node itself.

pub mod library;
pub mod npn;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Aig, AigNode, NodeId, Signal, simulation::evaluation_order, truth_table::TruthTable};

/// Parameters of cut enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutEnumerationParams {
    /// Largest number of leaves of a cut.
    pub cut_size: usize,
    /// Largest number of non-trivial cuts kept per node.
    pub cut_limit: usize,
    /// Shrinks every cut to the support of its function.
    pub minimize_truth_table: bool,
}

impl Default for CutEnumerationParams {
    fn default() -> Self {
        CutEnumerationParams {
            cut_size: 4,
            cut_limit: 8,
            minimize_truth_table: true,
        }
    }
}

/// A cut with its function: variable `i` of the function is `leaves[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut {
    leaves: Vec<NodeId>,
    function: TruthTable,
}

impl Cut {
    /// Cut made of the node itself.
    pub fn trivial(node: NodeId) -> Self {
        if node == 0 {
            return Cut {
                leaves: Vec::new(),
                function: TruthTable::const0(0),
            };
        }
        Cut {
            leaves: vec![node],
            function: TruthTable::nth_var(1, 0),
        }
    }

    /// Sorted leaves.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn function(&self) -> &TruthTable {
        &self.function
    }

    pub fn size(&self) -> usize {
        self.leaves.len()
    }

    /// True iff the leaves of `self` are a subset of the leaves of `other`.
    pub fn dominates(&self, other: &Cut) -> bool {
        self.leaves.len() <= other.leaves.len()
            && self.leaves.iter().all(|l| other.leaves.binary_search(l).is_ok())
    }

    fn merge(a: &Cut, ca: bool, b: &Cut, cb: bool, params: &CutEnumerationParams) -> Option<Cut> {
        let mut leaves = Vec::with_capacity(a.leaves.len() + b.leaves.len());
        let (mut i, mut j) = (0, 0);
        while i < a.leaves.len() || j < b.leaves.len() {
            let next = match (a.leaves.get(i), b.leaves.get(j)) {
                (Some(&x), Some(&y)) if x == y => {
                    i += 1;
                    j += 1;
                    x
                }
                (Some(&x), Some(&y)) if x < y => {
                    i += 1;
                    x
                }
                (Some(&x), None) => {
                    i += 1;
                    x
                }
                (_, Some(&y)) => {
                    j += 1;
                    y
                }
                (None, None) => unreachable!(),
            };
            leaves.push(next);
            if leaves.len() > params.cut_size {
                return None;
            }
        }

        let expand = |cut: &Cut, complement: bool| {
            let map: Vec<usize> = cut
                .leaves
                .iter()
                .filter_map(|l| leaves.binary_search(l).ok())
                .collect();
            let tt = cut.function.remap(leaves.len(), &map);
            if complement { !tt } else { tt }
        };
        let function = expand(a, ca) & expand(b, cb);
        let mut cut = Cut { leaves, function };
        if params.minimize_truth_table {
            cut.minimize();
        }
        Some(cut)
    }

    fn minimize(&mut self) {
        let (function, support) = self.function.min_base();
        if support.len() < self.leaves.len() {
            self.leaves = support.iter().map(|&v| self.leaves[v]).collect();
            self.function = function;
        }
    }
}

/// Computes the cuts of `node` from the cuts of its fanins.
fn node_cuts(
    node: NodeId,
    fanin_cuts: [&[Cut]; 2],
    fanins: [Signal; 2],
    params: &CutEnumerationParams,
) -> Vec<Cut> {
    let mut cuts: Vec<Cut> = Vec::new();
    for a in fanin_cuts[0] {
        for b in fanin_cuts[1] {
            let (ca, cb) = (fanins[0].is_complemented(), fanins[1].is_complemented());
            let Some(cut) = Cut::merge(a, ca, b, cb, params) else {
                continue;
            };
            if cuts.iter().any(|c| c.dominates(&cut)) {
                continue;
            }
            cuts.retain(|c| !cut.dominates(c));
            cuts.push(cut);
        }
    }
    cuts.sort_by(|x, y| (x.size(), &x.leaves).cmp(&(y.size(), &y.leaves)));
    cuts.truncate(params.cut_limit);
    if !cuts.iter().any(|c| c.leaves == [node]) {
        cuts.push(Cut::trivial(node));
    }
    cuts
}

/// Cuts of every node of an AIG.
#[derive(Debug, Clone, Default)]
pub struct CutSet {
    cuts: Vec<Vec<Cut>>,
}

impl CutSet {
    /// Cuts of `node`, the trivial cut last. Empty for dead or unknown nodes.
    pub fn cuts(&self, node: NodeId) -> &[Cut] {
        self.cuts.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_cuts(&self) -> usize {
        self.cuts.iter().map(Vec::len).sum()
    }
}

/// Enumerates the cuts of every live node.
///
/// Panics if `cut_size` is larger than [`crate::truth_table::MAX_VARS`].
///
/// ```rust
/// use aigsynth::{Aig, cut::{CutEnumerationParams, enumerate_cuts}};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let f = aig.create_and(a, b);
/// aig.create_po(f);
/// let cuts = enumerate_cuts(&aig, &CutEnumerationParams::default());
/// assert_eq!(cuts.cuts(f.node()).len(), 2);
/// assert_eq!(cuts.cuts(f.node())[0].function().to_binary(), "1000");
/// ```
pub fn enumerate_cuts(aig: &Aig, params: &CutEnumerationParams) -> CutSet {
    let mut cuts: Vec<Vec<Cut>> = vec![Vec::new(); aig.size()];
    cuts[0] = vec![Cut::trivial(0)];
    for ci in aig.cis() {
        cuts[ci] = vec![Cut::trivial(ci)];
    }
    for gate in evaluation_order(aig) {
        if let Some(AigNode::And([a, b])) = aig.node(gate) {
            let merged = node_cuts(gate, [&cuts[a.node()], &cuts[b.node()]], [*a, *b], params);
            cuts[gate] = merged;
        }
    }
    CutSet { cuts }
}

/// Cuts computed on demand, for passes that modify the AIG while walking it.
///
/// Cuts of a node only depend on its transitive fanin, so a pass visiting roots in
/// topological order never reads a stale entry; cuts whose leaves were taken out are
/// filtered anyway.
#[derive(Debug, Clone, Default)]
pub struct LazyCuts {
    params: CutEnumerationParams,
    memo: HashMap<NodeId, Vec<Cut>>,
}

impl LazyCuts {
    pub fn new(params: CutEnumerationParams) -> Self {
        LazyCuts {
            params,
            memo: HashMap::new(),
        }
    }

    /// Cuts of `node` in the current AIG.
    pub fn cuts(&mut self, aig: &Aig, node: NodeId) -> Vec<Cut> {
        let mut stack = vec![(node, false)];
        while let Some((n, expanded)) = stack.pop() {
            if self.memo.contains_key(&n) {
                continue;
            }
            let Some(AigNode::And([a, b])) = aig.node(n).copied() else {
                self.memo.insert(n, vec![Cut::trivial(n)]);
                continue;
            };
            if !expanded {
                stack.push((n, true));
                for f in [a, b] {
                    if !self.memo.contains_key(&f.node()) {
                        stack.push((f.node(), false));
                    }
                }
                continue;
            }
            let merged = {
                let ca = &self.memo[&a.node()];
                let cb = &self.memo[&b.node()];
                node_cuts(n, [ca, cb], [a, b], &self.params)
            };
            self.memo.insert(n, merged);
        }
        self.memo
            .get(&node)
            .map(|cuts| {
                cuts.iter()
                    .filter(|c| c.leaves.iter().all(|&l| !aig.is_dead(l)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn params(&self) -> &CutEnumerationParams {
        &self.params
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulation::simulate_nodes;

    fn sample() -> (Aig, Vec<Signal>) {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let d = aig.create_pi();
        let ab = aig.create_and(a, !b);
        let cd = aig.create_and(c, d);
        let f = aig.create_or(ab, cd);
        let g = aig.create_and(f, a);
        aig.create_po(g);
        (aig, vec![a, b, c, d, ab, cd, f, g])
    }

    #[test]
    fn trivial_cuts_test() {
        let (aig, s) = sample();
        let cuts = enumerate_cuts(&aig, &CutEnumerationParams::default());
        assert_eq!(cuts.cuts(s[0].node()), &[Cut::trivial(s[0].node())]);
        assert_eq!(cuts.cuts(0)[0].size(), 0);
        assert_eq!(cuts.cuts(s[4].node()).len(), 2);
        assert_eq!(cuts.cuts(s[4].node())[0].function().to_binary(), "0010");
        assert_eq!(cuts.cuts(s[7].node()).last().unwrap().leaves(), &[s[7].node()]);
    }

    #[test]
    fn cut_functions_test() {
        let (aig, s) = sample();
        let cuts = enumerate_cuts(&aig, &CutEnumerationParams::default());
        let values = simulate_nodes(&aig);
        for node in aig.gates() {
            for cut in cuts.cuts(node) {
                // check the cut function against global simulation
                for m in 0..16usize {
                    let index = cut
                        .leaves()
                        .iter()
                        .enumerate()
                        .fold(0, |acc, (j, &l)| acc | (values[l].get_bit(m) as usize) << j);
                    assert_eq!(cut.function().get_bit(index), values[node].get_bit(m));
                }
            }
        }
        let _ = s;
    }

    #[test]
    fn dominance_and_order_test() {
        let (aig, s) = sample();
        let cuts = enumerate_cuts(&aig, &CutEnumerationParams::default());
        let g_cuts = cuts.cuts(s[7].node());
        for (i, x) in g_cuts.iter().enumerate() {
            for (j, y) in g_cuts.iter().enumerate() {
                if i != j {
                    assert!(!x.dominates(y));
                }
            }
        }
        let sizes: Vec<usize> = g_cuts[..g_cuts.len() - 1].iter().map(Cut::size).collect();
        let mut sorted = sizes.clone();
        sorted.sort();
        assert_eq!(sizes, sorted);
    }

    #[test]
    fn minimization_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let ab = aig.create_and(a, b);
        let nab = aig.create_and(a, !b);
        // f = a & b | a & !b = a
        let f = aig.create_or(ab, nab);
        aig.create_po(f);
        let cuts = enumerate_cuts(&aig, &CutEnumerationParams::default());
        assert!(cuts.cuts(f.node()).iter().any(|c| c.leaves() == [a.node()]));

        let params = CutEnumerationParams {
            minimize_truth_table: false,
            ..Default::default()
        };
        let cuts = enumerate_cuts(&aig, &params);
        assert!(cuts.cuts(f.node()).iter().all(|c| c.leaves() != [a.node()]));
    }

    #[test]
    fn cut_limits_test() {
        let (aig, s) = sample();
        let params = CutEnumerationParams {
            cut_size: 2,
            cut_limit: 1,
            minimize_truth_table: true,
        };
        let cuts = enumerate_cuts(&aig, &params);
        for node in aig.gates() {
            assert!(cuts.cuts(node).len() <= 2);
            assert!(cuts.cuts(node).iter().all(|c| c.size() <= 2));
        }
        let _ = s;
    }

    #[test]
    fn lazy_cuts_test() {
        let (aig, s) = sample();
        let params = CutEnumerationParams::default();
        let all = enumerate_cuts(&aig, &params);
        let mut lazy = LazyCuts::new(params);
        assert_eq!(lazy.cuts(&aig, s[7].node()), all.cuts(s[7].node()));
        assert_eq!(lazy.cuts(&aig, s[5].node()), all.cuts(s[5].node()));
    }
}
