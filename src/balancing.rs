//! Depth-oriented rebalancing.
//!
//! The network is rebuilt gate by gate in topological order. Every gate is mapped to the
//! best of its plain copy, of its collapsed supergate rebuilt as a tree balanced by arrival
//! time, and of the resynthesis of each of its cuts over the already mapped leaves, where
//! best means lowest level, then fewest created gates.
//!
//! A supergate is the maximal AND tree below a gate whose inner gates are uncomplemented
//! and referenced once. With the ESOP function, maximal XOR trees are collapsed as well.

use std::{fmt, str::FromStr};

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::{
    Aig, AigError, NodeId, Result, Signal,
    cut::{CutEnumerationParams, enumerate_cuts},
    depth::DepthView,
    dfs::topological_order,
    resynthesis::{LevelTracker, balanced_and, balanced_xor, build_balanced_esop, build_balanced_isop},
    truth_table::check_width,
};

/// How a cut function is rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFunction {
    /// Sum of products, both levels balanced by arrival time.
    #[default]
    Sop,
    /// XOR of products, both levels balanced by arrival time.
    Esop,
}

impl FromStr for RebalanceFunction {
    type Err = AigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sop" => Ok(RebalanceFunction::Sop),
            "esop" => Ok(RebalanceFunction::Esop),
            _ => Err(AigError::UnknownRebalanceFunction(s.to_string())),
        }
    }
}

impl fmt::Display for RebalanceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceFunction::Sop => write!(f, "sop"),
            RebalanceFunction::Esop => write!(f, "esop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancingParams {
    pub cut_enumeration: CutEnumerationParams,
    /// Only resynthesizes gates on a critical path of the input network.
    pub only_on_critical_path: bool,
    pub rebalance_function: RebalanceFunction,
    /// Tries the ISOP of the complement as well.
    pub sop_both_phases: bool,
    pub verbose: bool,
}

impl Default for BalancingParams {
    fn default() -> Self {
        BalancingParams {
            cut_enumeration: CutEnumerationParams::default(),
            only_on_critical_path: false,
            rebalance_function: RebalanceFunction::Sop,
            sop_both_phases: true,
            verbose: false,
        }
    }
}

/// Rebalances `aig` (as an atomic pass).
///
/// ```rust
/// use aigsynth::{Aig, balancing::{BalancingParams, balancing}, depth::DepthView};
/// let mut aig = Aig::new();
/// let pis: Vec<_> = (0..5).map(|_| aig.create_pi()).collect();
/// let mut f = pis[0];
/// for &pi in &pis[1..] {
///     f = aig.create_and(f, pi);
/// }
/// aig.create_po(f);
/// assert_eq!(DepthView::new(&aig).num_levels(), 4);
/// balancing(&mut aig, &BalancingParams::default()).unwrap();
/// assert_eq!(DepthView::new(&aig).num_levels(), 3);
/// assert_eq!(aig.num_gates(), 4);
/// ```
pub fn balancing(aig: &mut Aig, params: &BalancingParams) -> Result<()> {
    check_width("cut_size", params.cut_enumeration.cut_size)?;
    let depth_before = DepthView::new(aig);
    let gates_before = aig.num_gates();
    let cuts = enumerate_cuts(aig, &params.cut_enumeration);
    let (mut dest, mut map) = aig.rebuild_inputs();
    let mut levels = LevelTracker::new(&dest);
    let mut resynthesized = 0;

    for gate in topological_order(aig)? {
        let mapped = |s: Signal| {
            map[s.node()]
                .map(|m| m ^ s.is_complemented())
                .ok_or_else(|| AigError::InvalidState(format!("fanin {} was not rebuilt", s.node())))
        };
        let fanins = aig
            .fanins(gate)
            .iter()
            .map(|&f| mapped(f))
            .collect::<Result<Vec<Signal>>>()?;

        let mut created = dest.num_gates();
        let copy = dest.clone_node(aig, gate, &fanins)?;
        levels.sync(&dest);
        let mut best = (levels.level(copy), dest.num_gates() - created, copy);

        if !params.only_on_critical_path || depth_before.is_on_critical_path(gate) {
            let mut trees = Vec::with_capacity(2);
            if !absorbed_and(aig, gate) {
                let leaves = and_leaves(aig, gate);
                if leaves.len() > 2 {
                    let leaves = leaves.into_iter().map(mapped).collect::<Result<Vec<Signal>>>()?;
                    created = dest.num_gates();
                    let s = balanced_and(&mut dest, &mut levels, leaves);
                    trees.push((levels.level(s), dest.num_gates() - created, s));
                }
            }
            if params.rebalance_function == RebalanceFunction::Esop && !absorbed_xor(aig, gate) {
                if let Some((leaves, parity)) = xor_leaves(aig, gate).filter(|(l, _)| l.len() > 2) {
                    let leaves = leaves.into_iter().map(mapped).collect::<Result<Vec<Signal>>>()?;
                    created = dest.num_gates();
                    let s = balanced_xor(&mut dest, &mut levels, leaves) ^ parity;
                    trees.push((levels.level(s), dest.num_gates() - created, s));
                }
            }
            for tree in trees {
                if (tree.0, tree.1) < (best.0, best.1) {
                    trace!("gate {gate}: supergate gives level {} with {} new gates", tree.0, tree.1);
                    best = tree;
                }
            }

            for cut in cuts.cuts(gate) {
                let Some(leaves) = cut
                    .leaves()
                    .iter()
                    .map(|&l| map[l])
                    .collect::<Option<Vec<Signal>>>()
                else {
                    continue;
                };
                let phases: &[bool] = if params.sop_both_phases { &[false, true] } else { &[false] };
                let mut candidates = Vec::with_capacity(2);
                match params.rebalance_function {
                    RebalanceFunction::Sop => {
                        for &phase in phases {
                            created = dest.num_gates();
                            let s = build_balanced_isop(&mut dest, &mut levels, cut.function(), &leaves, phase);
                            candidates.push((levels.level(s), dest.num_gates() - created, s));
                        }
                    }
                    RebalanceFunction::Esop => {
                        created = dest.num_gates();
                        let s = build_balanced_esop(&mut dest, &mut levels, cut.function(), &leaves);
                        candidates.push((levels.level(s), dest.num_gates() - created, s));
                    }
                }
                for candidate in candidates {
                    if (candidate.0, candidate.1) < (best.0, best.1) {
                        trace!(
                            "gate {gate}: cut {:?} gives level {} with {} new gates",
                            cut.leaves(),
                            candidate.0,
                            candidate.1
                        );
                        best = candidate;
                    }
                }
            }
        }
        if best.2 != copy {
            resynthesized += 1;
        }
        map[gate] = Some(best.2);
    }

    aig.rebuild_outputs(&mut dest, &map)?;
    dest.cleanup_dangling()?;
    let depth_after = DepthView::new(&dest).num_levels();
    if params.verbose {
        info!(
            "balancing ({}): depth {} -> {}, {} -> {} gates",
            params.rebalance_function,
            depth_before.num_levels(),
            depth_after,
            gates_before,
            dest.num_gates()
        );
    }
    debug!(
        "balancing: {resynthesized} gates resynthesized, depth {} -> {depth_after}",
        depth_before.num_levels()
    );
    *aig = dest;
    Ok(())
}

/// True if the only reference to `node` is an uncomplemented fanin of an AND gate.
fn absorbed_and(aig: &Aig, node: NodeId) -> bool {
    aig.is_and(node)
        && aig.fanout_size(node) == 1
        && aig
            .fanouts(node)
            .first()
            .is_some_and(|&parent| aig.fanins(parent).contains(&Signal::from_node(node)))
}

/// Leaves of the AND supergate rooted at `gate`, without duplicates.
fn and_leaves(aig: &Aig, gate: NodeId) -> Vec<Signal> {
    let mut leaves = Vec::new();
    let mut stack = aig.fanins(gate).to_vec();
    while let Some(s) = stack.pop() {
        if !s.is_complemented() && absorbed_and(aig, s.node()) {
            stack.extend_from_slice(aig.fanins(s.node()));
        } else if !leaves.contains(&s) {
            leaves.push(s);
        }
    }
    leaves
}

/// Operands `(p, q)` of a node `!(p & q) & !(!p & !q)`, which computes `p ^ q`.
fn xor_operands(aig: &Aig, node: NodeId) -> Option<(Signal, Signal)> {
    let &[h1, h2] = aig.fanins(node) else {
        return None;
    };
    if !h1.is_complemented() || !h2.is_complemented() {
        return None;
    }
    let &[p, q] = aig.fanins(h1.node()) else {
        return None;
    };
    match *aig.fanins(h2.node()) {
        [r, s] if (r, s) == (!p, !q) || (r, s) == (!q, !p) => Some((p, q)),
        _ => None,
    }
}

/// True if the XOR node `node` and its two halves are only read by the XOR node `parent`.
fn xor_feeds_only(aig: &Aig, node: NodeId, parent: NodeId) -> bool {
    aig.fanout_size(node) == 2
        && aig
            .fanouts(node)
            .iter()
            .all(|&h| aig.fanout_size(h) == 1 && aig.fanouts(h) == [parent])
        && aig.fanins(node).iter().all(|h| aig.fanout_size(h.node()) == 1)
}

fn absorbed_xor(aig: &Aig, node: NodeId) -> bool {
    let Some(&half) = aig.fanouts(node).first() else {
        return false;
    };
    let Some(&parent) = aig.fanouts(half).first() else {
        return false;
    };
    xor_operands(aig, node).is_some() && xor_operands(aig, parent).is_some() && xor_feeds_only(aig, node, parent)
}

/// Leaves of the XOR supergate rooted at `gate` and the parity of the complements met on
/// the way. Leaves are uncomplemented, and leaves met twice cancel out.
fn xor_leaves(aig: &Aig, gate: NodeId) -> Option<(Vec<Signal>, bool)> {
    let (p, q) = xor_operands(aig, gate)?;
    let mut leaves: Vec<Signal> = Vec::new();
    let mut parity = false;
    let mut stack = vec![(p, gate), (q, gate)];
    while let Some((s, parent)) = stack.pop() {
        parity ^= s.is_complemented();
        let node = s.node();
        match xor_operands(aig, node) {
            Some((p, q)) if xor_feeds_only(aig, node, parent) => {
                stack.push((p, node));
                stack.push((q, node));
            }
            _ => {
                let leaf = s.positive();
                match leaves.iter().position(|&l| l == leaf) {
                    Some(i) => {
                        leaves.swap_remove(i);
                    }
                    None => leaves.push(leaf),
                }
            }
        }
    }
    Some((leaves, parity))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulation::simulate;
    use test_case::test_case;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn and_chain(aig: &mut Aig, inputs: usize) -> Signal {
        let pis: Vec<Signal> = (0..inputs).map(|_| aig.create_pi()).collect();
        pis[1..].iter().fold(pis[0], |f, &pi| aig.create_and(f, pi))
    }

    fn check(aig: &mut Aig, params: &BalancingParams) {
        init();
        let before = simulate(aig);
        let pis = aig.num_pis();
        let pos = aig.num_pos();
        balancing(aig, params).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(aig.num_pis(), pis);
        assert_eq!(aig.num_pos(), pos);
        assert_eq!(simulate(aig), before);
    }

    #[test]
    fn rebalance_function_test() {
        assert_eq!("sop".parse::<RebalanceFunction>().unwrap(), RebalanceFunction::Sop);
        assert_eq!("esop".parse::<RebalanceFunction>().unwrap(), RebalanceFunction::Esop);
        let err = "aig".parse::<RebalanceFunction>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown rebalance function: 'aig'. Possible values are 'sop' and 'esop'."
        );
        assert_eq!(RebalanceFunction::Esop.to_string(), "esop");
    }

    fn ceil_log2(k: usize) -> u32 {
        k.next_power_of_two().trailing_zeros()
    }

    #[test_case(2 ; "two inputs")]
    #[test_case(3 ; "three inputs")]
    #[test_case(5 ; "five inputs")]
    #[test_case(7 ; "seven inputs")]
    #[test_case(8 ; "eight inputs")]
    #[test_case(9 ; "nine inputs")]
    #[test_case(16 ; "sixteen inputs")]
    #[test_case(17 ; "seventeen inputs")]
    #[test_case(33 ; "thirty-three inputs")]
    fn and_chain_test(inputs: usize) {
        let mut aig = Aig::new();
        let f = and_chain(&mut aig, inputs);
        aig.create_po(f);
        assert_eq!(DepthView::new(&aig).num_levels() as usize, inputs - 1);
        check(&mut aig, &BalancingParams::default());
        assert_eq!(DepthView::new(&aig).num_levels(), ceil_log2(inputs));
        assert_eq!(aig.num_gates(), inputs - 1);
    }

    #[test_case(6 ; "six inputs")]
    #[test_case(12 ; "twelve inputs")]
    fn right_leaning_chain_test(inputs: usize) {
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..inputs).map(|_| aig.create_pi()).collect();
        let f = pis[..inputs - 1]
            .iter()
            .rev()
            .fold(!pis[inputs - 1], |f, &pi| aig.create_and(!pi, f));
        aig.create_po(!f);
        check(&mut aig, &BalancingParams::default());
        assert_eq!(DepthView::new(&aig).num_levels(), ceil_log2(inputs));
        assert_eq!(aig.num_gates(), inputs - 1);
    }

    #[test]
    fn shared_gate_bounds_supergate_test() {
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..8).map(|_| aig.create_pi()).collect();
        let low = pis[1..4].iter().fold(pis[0], |f, &pi| aig.create_and(f, pi));
        let f = pis[4..].iter().fold(low, |f, &pi| aig.create_and(f, pi));
        aig.create_po(f);
        aig.create_po(low);
        check(&mut aig, &BalancingParams::default());
        assert_eq!(DepthView::new(&aig).level(aig.po_at(1).unwrap().node()), 2);
        assert_eq!(DepthView::new(&aig).num_levels(), 3);
        assert_eq!(aig.num_gates(), 7);
    }

    #[test]
    fn small_cuts_still_collapse_chain_test() {
        let mut aig = Aig::new();
        let f = and_chain(&mut aig, 9);
        aig.create_po(f);
        let params = BalancingParams {
            cut_enumeration: CutEnumerationParams {
                cut_size: 2,
                ..CutEnumerationParams::default()
            },
            ..BalancingParams::default()
        };
        check(&mut aig, &params);
        assert_eq!(DepthView::new(&aig).num_levels(), 4);
        assert_eq!(aig.num_gates(), 8);
    }

    #[test]
    fn balanced_tree_is_kept_test() {
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..4).map(|_| aig.create_pi()).collect();
        let ab = aig.create_and(pis[0], pis[1]);
        let cd = aig.create_and(pis[2], pis[3]);
        let f = aig.create_and(ab, cd);
        aig.create_po(!f);
        check(&mut aig, &BalancingParams::default());
        assert_eq!(DepthView::new(&aig).num_levels(), 2);
        assert_eq!(aig.num_gates(), 3);
    }

    #[test]
    fn critical_path_only_test() {
        let build = || {
            let mut aig = Aig::new();
            let long = and_chain(&mut aig, 5);
            let short = and_chain(&mut aig, 4);
            aig.create_po(long);
            aig.create_po(short);
            aig
        };
        let short_level = |aig: &Aig| DepthView::new(aig).level(aig.po_at(1).unwrap().node());

        let mut everywhere = build();
        check(&mut everywhere, &BalancingParams::default());
        assert_eq!(short_level(&everywhere), 2);

        let mut critical = build();
        let params = BalancingParams {
            only_on_critical_path: true,
            ..BalancingParams::default()
        };
        check(&mut critical, &params);
        assert_eq!(DepthView::new(&critical).num_levels(), 3);
        assert_eq!(short_level(&critical), 3);
    }

    #[test]
    fn esop_test() {
        let params = BalancingParams {
            rebalance_function: RebalanceFunction::Esop,
            ..BalancingParams::default()
        };
        let mut aig = Aig::new();
        let f = and_chain(&mut aig, 9);
        aig.create_po(f);
        check(&mut aig, &params);
        assert_eq!(DepthView::new(&aig).num_levels(), 4);
        assert_eq!(aig.num_gates(), 8);
    }

    #[test_case(4 ; "four inputs")]
    #[test_case(8 ; "eight inputs")]
    #[test_case(11 ; "eleven inputs")]
    fn xor_chain_test(inputs: usize) {
        let params = BalancingParams {
            rebalance_function: RebalanceFunction::Esop,
            ..BalancingParams::default()
        };
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..inputs).map(|_| aig.create_pi()).collect();
        let f = pis[1..].iter().fold(!pis[0], |f, &pi| aig.create_xor(f, pi));
        aig.create_po(f);
        assert_eq!(DepthView::new(&aig).num_levels() as usize, 2 * (inputs - 1));
        check(&mut aig, &params);
        assert!(DepthView::new(&aig).num_levels() <= 2 * ceil_log2(inputs));
    }

    #[test]
    fn xor_leaves_test() {
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..3).map(|_| aig.create_pi()).collect();
        let ab = aig.create_xor(pis[0], !pis[1]);
        let f = aig.create_xor(ab, pis[2]);
        let node = f.node();
        let (mut leaves, parity) = xor_leaves(&aig, node).unwrap();
        leaves.sort();
        assert_eq!(leaves, pis);
        // f = a ^ b ^ c ^ 1, and the node itself is f or !f
        assert!(parity ^ f.is_complemented());
        assert!(absorbed_xor(&aig, ab.node()));
        assert!(!absorbed_xor(&aig, node));
        assert_eq!(xor_operands(&aig, pis[0].node()), None);
    }

    #[test]
    fn sequential_interface_test() {
        let mut aig = Aig::new();
        let a = aig.create_named_pi("a");
        let r = aig.create_ro();
        let f = and_chain(&mut aig, 4);
        let g = aig.create_and(f, a);
        let g = aig.create_and(g, r);
        aig.create_named_po(g, "out");
        aig.create_ri(!g);
        check(&mut aig, &BalancingParams::default());
        assert_eq!(aig.num_registers(), 1);
        assert_eq!(aig.ri_at(0).unwrap(), !aig.po_at(0).unwrap());
        assert_eq!(aig.get_output_name(0), Some("out"));
        assert_eq!(aig.get_name(aig.pi_at(0).unwrap()), Some("a"));
    }
}
