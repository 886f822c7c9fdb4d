//! Window-based Boolean resubstitution.
//!
//! For every gate, a reconvergence-driven cut bounds a window. The function of the root is
//! re-expressed with divisors, nodes of the window that survive the removal of the root's
//! maximum fanout-free cone (MFFC). Up to three new gates are inserted, and only when the
//! gates freed outnumber them.

use std::collections::HashSet;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::{
    Aig, NodeId, Result, Signal,
    dfs::{all_gates_topological, cone, mffc, reconvergence_cut},
    index_list::IndexList,
    replacement::{evaluate, splice},
    resynthesis::LevelTracker,
    truth_table::{TruthTable, check_width},
    window::{care_set, signal_table, simulate_window},
};

/// Largest number of unate literals combined by 2- and 3-resubstitution.
const UNATE_LIMIT: usize = 32;
/// Largest number of pair products tried by 3-resubstitution.
const PAIR_LIMIT: usize = 64;
/// Candidates kept per stage before evaluation.
const CANDIDATE_LIMIT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResubstitutionParams {
    /// Largest number of leaves of the window.
    pub max_pis: usize,
    pub max_divisors: usize,
    /// Largest number of gates inserted for one root.
    pub max_inserts: usize,
    pub skip_fanout_limit_for_roots: usize,
    pub skip_fanout_limit_for_divisors: usize,
    pub verbose: bool,
    pub use_dont_cares: bool,
    /// Largest number of inputs of the window simulated for don't-cares.
    pub window_size: usize,
    pub preserve_depth: bool,
}

impl Default for ResubstitutionParams {
    fn default() -> Self {
        ResubstitutionParams {
            max_pis: 8,
            max_divisors: 150,
            max_inserts: 2,
            skip_fanout_limit_for_roots: 1000,
            skip_fanout_limit_for_divisors: 100,
            verbose: false,
            use_dont_cares: false,
            window_size: 12,
            preserve_depth: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResubStats {
    pub gates_before: usize,
    pub gates_after: usize,
    pub roots: usize,
    /// Accepted substitutions by number of inserted gates.
    pub resubs: [usize; 4],
    pub estimated_gain: usize,
}

/// Shapes of the replacement functions, over the divisor literals `s1, s2, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    /// `s1`
    Divisor,
    /// `s1 & s2`
    And2,
    /// `s1 | s2`
    Or2,
    /// `s1 & s2 & s3`
    And3,
    /// `s1 | s2 | s3`
    Or3,
    /// `s1 & (s2 | s3)`
    AndOr,
    /// `s1 | (s2 & s3)`
    OrAnd,
    /// `(s1 & s2) | (s3 & s4)`
    OrOfAnds,
    /// `(s1 | s2) & (s3 | s4)`
    AndOfOrs,
}

impl Form {
    fn inserts(self) -> usize {
        match self {
            Form::Divisor => 0,
            Form::And2 | Form::Or2 => 1,
            Form::And3 | Form::Or3 | Form::AndOr | Form::OrAnd => 2,
            Form::OrOfAnds | Form::AndOfOrs => 3,
        }
    }

    fn structure(self) -> IndexList {
        let num_inputs = match self {
            Form::Divisor => 1,
            Form::And2 | Form::Or2 => 2,
            Form::And3 | Form::Or3 | Form::AndOr | Form::OrAnd => 3,
            Form::OrOfAnds | Form::AndOfOrs => 4,
        };
        let mut list = IndexList::new(num_inputs);
        let or = |list: &mut IndexList, a: u32, b: u32| list.add_and(a ^ 1, b ^ 1) ^ 1;
        let output = match self {
            Form::Divisor => 2,
            Form::And2 => list.add_and(2, 4),
            Form::Or2 => or(&mut list, 2, 4),
            Form::And3 => {
                let a = list.add_and(2, 4);
                list.add_and(a, 6)
            }
            Form::Or3 => {
                let a = or(&mut list, 2, 4);
                or(&mut list, a, 6)
            }
            Form::AndOr => {
                let a = or(&mut list, 4, 6);
                list.add_and(2, a)
            }
            Form::OrAnd => {
                let a = list.add_and(4, 6);
                or(&mut list, 2, a)
            }
            Form::OrOfAnds => {
                let a = list.add_and(2, 4);
                let b = list.add_and(6, 8);
                or(&mut list, a, b)
            }
            Form::AndOfOrs => {
                let a = or(&mut list, 2, 4);
                let b = or(&mut list, 6, 8);
                list.add_and(a, b)
            }
        };
        list.add_output(output);
        list
    }
}

/// A literal of a divisor with its function over the window leaves.
struct Literal {
    signal: Signal,
    table: TruthTable,
}

struct Window {
    leaves: Vec<NodeId>,
    target: TruthTable,
    care: TruthTable,
    literals: Vec<Literal>,
}

impl Window {
    fn equal(&self, a: &TruthTable, b: &TruthTable) -> bool {
        ((a ^ b) & &self.care).is_const0()
    }

    fn implies(&self, a: &TruthTable, b: &TruthTable) -> bool {
        (a & &!b & &self.care).is_const0()
    }

    /// Literals implied by the target, usable in AND forms.
    fn positive_unate(&self) -> Vec<usize> {
        (0..self.literals.len())
            .filter(|&i| self.implies(&self.target, &self.literals[i].table))
            .take(UNATE_LIMIT)
            .collect()
    }

    /// Literals implying the target, usable in OR forms.
    fn negative_unate(&self) -> Vec<usize> {
        (0..self.literals.len())
            .filter(|&i| self.implies(&self.literals[i].table, &self.target))
            .take(UNATE_LIMIT)
            .collect()
    }

    fn signals(&self, indices: &[usize]) -> Vec<Signal> {
        indices.iter().map(|&i| self.literals[i].signal).collect()
    }

    fn table(&self, i: usize) -> &TruthTable {
        &self.literals[i].table
    }

    fn zero_resub(&self) -> Vec<(Form, Vec<Signal>)> {
        let mut found = Vec::new();
        if (&self.target & &self.care).is_const0() {
            found.push((Form::Divisor, vec![Signal::FALSE]));
        }
        if (&!&self.target & &self.care).is_const0() {
            found.push((Form::Divisor, vec![Signal::TRUE]));
        }
        for (i, literal) in self.literals.iter().enumerate() {
            if self.equal(&literal.table, &self.target) {
                found.push((Form::Divisor, self.signals(&[i])));
            }
        }
        found.truncate(CANDIDATE_LIMIT);
        found
    }

    fn one_resub(&self, pos: &[usize], neg: &[usize]) -> Vec<(Form, Vec<Signal>)> {
        let mut found = Vec::new();
        for (x, &i) in pos.iter().enumerate() {
            for &j in &pos[x + 1..] {
                if self.equal(&(self.table(i) & self.table(j)), &self.target) {
                    found.push((Form::And2, self.signals(&[i, j])));
                }
            }
        }
        for (x, &i) in neg.iter().enumerate() {
            for &j in &neg[x + 1..] {
                if self.equal(&(self.table(i) | self.table(j)), &self.target) {
                    found.push((Form::Or2, self.signals(&[i, j])));
                }
            }
        }
        found.truncate(CANDIDATE_LIMIT);
        found
    }

    fn two_resub(&self, pos: &[usize], neg: &[usize]) -> Vec<(Form, Vec<Signal>)> {
        let mut found = Vec::new();
        for (x, &i) in pos.iter().enumerate() {
            for (y, &j) in pos.iter().enumerate().skip(x + 1) {
                let ij = self.table(i) & self.table(j);
                for &k in &pos[y + 1..] {
                    if self.equal(&(&ij & self.table(k)), &self.target) {
                        found.push((Form::And3, self.signals(&[i, j, k])));
                    }
                }
            }
        }
        for (x, &i) in neg.iter().enumerate() {
            for (y, &j) in neg.iter().enumerate().skip(x + 1) {
                let ij = self.table(i) | self.table(j);
                for &k in &neg[y + 1..] {
                    if self.equal(&(&ij | self.table(k)), &self.target) {
                        found.push((Form::Or3, self.signals(&[i, j, k])));
                    }
                }
            }
        }
        let all: Vec<usize> = (0..self.literals.len()).take(2 * UNATE_LIMIT).collect();
        for &i in pos {
            for (y, &j) in all.iter().enumerate() {
                for &k in &all[y + 1..] {
                    let inner = self.table(j) | self.table(k);
                    if self.equal(&(self.table(i) & &inner), &self.target) {
                        found.push((Form::AndOr, self.signals(&[i, j, k])));
                    }
                }
            }
            if found.len() >= CANDIDATE_LIMIT {
                break;
            }
        }
        for &i in neg {
            for (y, &j) in all.iter().enumerate() {
                for &k in &all[y + 1..] {
                    let inner = self.table(j) & self.table(k);
                    if self.equal(&(self.table(i) | &inner), &self.target) {
                        found.push((Form::OrAnd, self.signals(&[i, j, k])));
                    }
                }
            }
            if found.len() >= CANDIDATE_LIMIT {
                break;
            }
        }
        found.truncate(CANDIDATE_LIMIT);
        found
    }

    fn three_resub(&self) -> Vec<(Form, Vec<Signal>)> {
        let limited: Vec<usize> = (0..self.literals.len()).take(2 * UNATE_LIMIT).collect();
        let mut products: Vec<([usize; 2], TruthTable)> = Vec::new();
        let mut sums: Vec<([usize; 2], TruthTable)> = Vec::new();
        for (x, &i) in limited.iter().enumerate() {
            for &j in &limited[x + 1..] {
                let product = self.table(i) & self.table(j);
                if products.len() < PAIR_LIMIT && !product.is_const0() && self.implies(&product, &self.target) {
                    products.push(([i, j], product));
                }
                let sum = self.table(i) | self.table(j);
                if sums.len() < PAIR_LIMIT && !sum.is_const1() && self.implies(&self.target, &sum) {
                    sums.push(([i, j], sum));
                }
            }
        }
        let mut found = Vec::new();
        for (x, (p, pt)) in products.iter().enumerate() {
            for (q, qt) in &products[x + 1..] {
                if self.equal(&(pt | qt), &self.target) {
                    found.push((Form::OrOfAnds, self.signals(&[p[0], p[1], q[0], q[1]])));
                }
            }
        }
        for (x, (p, pt)) in sums.iter().enumerate() {
            for (q, qt) in &sums[x + 1..] {
                if self.equal(&(pt & qt), &self.target) {
                    found.push((Form::AndOfOrs, self.signals(&[p[0], p[1], q[0], q[1]])));
                }
            }
        }
        found.truncate(CANDIDATE_LIMIT);
        found
    }
}

/// Collects the window, the divisors and their functions around `root`.
fn build_window(aig: &Aig, root: NodeId, params: &ResubstitutionParams) -> Option<(Window, usize)> {
    let leaves = reconvergence_cut(aig, root, params.max_pis);
    let freed = mffc(aig, root, &leaves);
    if freed.is_empty() {
        return None;
    }
    let in_mffc: HashSet<NodeId> = freed.iter().copied().collect();
    let cone_nodes = cone(aig, root, &leaves);

    let mut divisors: Vec<NodeId> = leaves.clone();
    let mut is_divisor: HashSet<NodeId> = leaves.iter().copied().collect();
    for &node in &cone_nodes {
        if !in_mffc.contains(&node) && is_divisor.insert(node) {
            divisors.push(node);
        }
    }
    let mut side: Vec<NodeId> = Vec::new();
    let mut next = 0;
    while next < divisors.len() && divisors.len() < params.max_divisors {
        let divisor = divisors[next];
        next += 1;
        for &fanout in aig.fanouts(divisor) {
            if divisors.len() >= params.max_divisors {
                break;
            }
            if is_divisor.contains(&fanout) || in_mffc.contains(&fanout) || aig.is_dead(fanout) {
                continue;
            }
            if aig.fanins(fanout).iter().all(|f| is_divisor.contains(&f.node())) {
                is_divisor.insert(fanout);
                divisors.push(fanout);
                side.push(fanout);
            }
        }
    }

    let mut nodes = cone_nodes;
    nodes.extend(side);
    let values = simulate_window(aig, &leaves, &nodes);
    let num_vars = leaves.len();
    let target = signal_table(&values, Signal::from_node(root), num_vars);
    let care = if params.use_dont_cares {
        care_set(aig, &leaves, params.window_size)
    } else {
        TruthTable::const1(num_vars)
    };

    let literals = divisors
        .iter()
        .filter(|&&d| d != 0 && aig.fanout_size(d) <= params.skip_fanout_limit_for_divisors)
        .take(params.max_divisors)
        .flat_map(|&d| {
            let table = signal_table(&values, Signal::from_node(d), num_vars);
            [
                Literal {
                    signal: !Signal::from_node(d),
                    table: !&table,
                },
                Literal {
                    signal: Signal::from_node(d),
                    table,
                },
            ]
        })
        .collect();
    let window = Window {
        leaves,
        target,
        care,
        literals,
    };
    Some((window, freed.len()))
}

/// Resubstitutes `aig` in place (as an atomic pass).
///
/// ```rust
/// use aigsynth::{Aig, resubstitution::{ResubstitutionParams, aig_resubstitution}};
/// let mut aig = Aig::new();
/// let x0 = aig.create_pi();
/// let x1 = aig.create_pi();
/// let n = aig.create_and(!x0, !x1);
/// let f = aig.create_and(x0, !n);
/// aig.create_po(f);
/// aig_resubstitution(&mut aig, &ResubstitutionParams::default()).unwrap();
/// assert_eq!(aig.num_gates(), 0);
/// assert_eq!(aig.po_at(0).unwrap(), x0);
/// ```
pub fn aig_resubstitution(aig: &mut Aig, params: &ResubstitutionParams) -> Result<ResubStats> {
    check_width("max_pis", params.max_pis)?;
    let mut work = aig.clone();
    let mut stats = ResubStats {
        gates_before: work.num_gates(),
        ..ResubStats::default()
    };
    let mut levels = LevelTracker::new(&work);

    for root in all_gates_topological(&work)? {
        if work.is_dead(root) || work.fanout_size(root) > params.skip_fanout_limit_for_roots {
            continue;
        }
        stats.roots += 1;
        let Some((window, mffc_size)) = build_window(&work, root, params) else {
            continue;
        };

        let pos = window.positive_unate();
        let neg = window.negative_unate();
        let mut stages = vec![window.zero_resub(), window.one_resub(&pos, &neg)];
        if params.max_inserts >= 2 && mffc_size > 2 {
            stages.push(window.two_resub(&pos, &neg));
        }
        if params.max_inserts >= 3 && mffc_size > 3 {
            stages.push(window.three_resub());
        }

        'stages: for candidates in stages {
            for (form, inputs) in candidates {
                if form.inserts() > params.max_inserts {
                    continue;
                }
                let structure = form.structure();
                let Some(eval) = evaluate(&work, &levels, &structure, &inputs, root, &window.leaves) else {
                    continue;
                };
                if eval.gain <= 0 || (params.preserve_depth && eval.level > levels.node_level(root)) {
                    continue;
                }
                trace!("root {root}: {form:?} of {inputs:?}, gain {}", eval.gain);
                if splice(&mut work, &structure, &inputs, false, root)? {
                    stats.resubs[form.inserts()] += 1;
                    stats.estimated_gain += eval.gain as usize;
                    if params.preserve_depth {
                        levels = LevelTracker::new(&work);
                    } else {
                        levels.sync(&work);
                    }
                    break 'stages;
                }
            }
        }
    }

    work.cleanup_dangling()?;
    stats.gates_after = work.num_gates();
    if params.verbose {
        info!(
            "resubstitution: {:?} substitutions, {} -> {} gates",
            stats.resubs, stats.gates_before, stats.gates_after
        );
    }
    debug!("resubstitution: {stats:?}");
    *aig = work;
    Ok(stats)
}
