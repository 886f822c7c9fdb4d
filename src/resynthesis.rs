//! Building AIG structures from truth tables and covers.
//!
//! Every builder creates its gates through a [`LevelTracker`], so that trees can be balanced
//! by arrival time: the two earliest signals are always combined first.

use crate::{
    Aig, NodeId, Signal,
    simulation::evaluation_order,
    truth_table::{Cube, TruthTable, esop, isop},
};

/// Levels of the nodes of an AIG under construction.
#[derive(Debug, Clone, Default)]
pub struct LevelTracker {
    levels: Vec<u32>,
}

impl LevelTracker {
    pub fn new(aig: &Aig) -> Self {
        let mut levels = vec![0; aig.size()];
        for gate in evaluation_order(aig) {
            levels[gate] = 1 + aig.fanins(gate).iter().map(|f| levels[f.node()]).max().unwrap_or(0);
        }
        LevelTracker { levels }
    }

    pub fn level(&self, signal: Signal) -> u32 {
        self.node_level(signal.node())
    }

    pub fn node_level(&self, node: NodeId) -> u32 {
        self.levels.get(node).copied().unwrap_or(0)
    }

    /// Records the nodes created since the last call.
    pub fn sync(&mut self, aig: &Aig) {
        for node in self.levels.len()..aig.size() {
            let level = match aig.fanins(node) {
                [] => 0,
                fanins => {
                    let known = |f: &Signal| self.levels.get(f.node()).copied().unwrap_or(0);
                    1 + fanins.iter().map(known).max().unwrap_or(0)
                }
            };
            self.levels.push(level);
        }
    }

    /// [`Aig::create_and`] keeping levels up to date.
    pub fn create_and(&mut self, aig: &mut Aig, a: Signal, b: Signal) -> Signal {
        let s = aig.create_and(a, b);
        self.sync(aig);
        s
    }

    pub fn create_or(&mut self, aig: &mut Aig, a: Signal, b: Signal) -> Signal {
        !self.create_and(aig, !a, !b)
    }

    pub fn create_xor(&mut self, aig: &mut Aig, a: Signal, b: Signal) -> Signal {
        let s = aig.create_xor(a, b);
        self.sync(aig);
        s
    }
}

/// Combines `signals` with `combine`, always pairing the two lowest levels first. Ties keep
/// the input order.
fn balanced_tree(
    aig: &mut Aig,
    levels: &mut LevelTracker,
    mut signals: Vec<Signal>,
    empty: Signal,
    combine: fn(&mut LevelTracker, &mut Aig, Signal, Signal) -> Signal,
) -> Signal {
    if signals.is_empty() {
        return empty;
    }
    while signals.len() > 1 {
        signals.sort_by_key(|s| levels.level(*s));
        let a = signals.remove(0);
        let b = signals.remove(0);
        let s = combine(levels, aig, a, b);
        signals.push(s);
    }
    signals[0]
}

pub fn balanced_and(aig: &mut Aig, levels: &mut LevelTracker, signals: Vec<Signal>) -> Signal {
    balanced_tree(aig, levels, signals, Signal::TRUE, LevelTracker::create_and)
}

pub fn balanced_or(aig: &mut Aig, levels: &mut LevelTracker, signals: Vec<Signal>) -> Signal {
    balanced_tree(aig, levels, signals, Signal::FALSE, LevelTracker::create_or)
}

pub fn balanced_xor(aig: &mut Aig, levels: &mut LevelTracker, signals: Vec<Signal>) -> Signal {
    balanced_tree(aig, levels, signals, Signal::FALSE, LevelTracker::create_xor)
}

fn cube_literals(cube: &Cube, leaves: &[Signal]) -> Vec<Signal> {
    cube.literals().map(|(var, positive)| leaves[var] ^ !positive).collect()
}

pub fn build_cube(aig: &mut Aig, levels: &mut LevelTracker, cube: &Cube, leaves: &[Signal]) -> Signal {
    balanced_and(aig, levels, cube_literals(cube, leaves))
}

/// Sum of products: every cube is balanced, then the OR of the cubes.
pub fn build_sop(aig: &mut Aig, levels: &mut LevelTracker, cubes: &[Cube], leaves: &[Signal]) -> Signal {
    let products: Vec<Signal> = cubes.iter().map(|c| build_cube(aig, levels, c, leaves)).collect();
    balanced_or(aig, levels, products)
}

/// XOR of products, both levels balanced.
pub fn build_esop(aig: &mut Aig, levels: &mut LevelTracker, cubes: &[Cube], leaves: &[Signal]) -> Signal {
    let products: Vec<Signal> = cubes.iter().map(|c| build_cube(aig, levels, c, leaves)).collect();
    balanced_xor(aig, levels, products)
}

/// Algebraically factored form of a cover: the literal shared by the most cubes is
/// repeatedly divided out.
pub fn build_factored(aig: &mut Aig, levels: &mut LevelTracker, cubes: &[Cube], leaves: &[Signal]) -> Signal {
    if cubes.len() <= 1 {
        return build_sop(aig, levels, cubes, leaves);
    }
    if cubes.iter().any(|c| c.num_literals() == 0) {
        return Signal::TRUE;
    }

    let mut best: Option<((usize, bool), usize)> = None;
    for var in 0..leaves.len() {
        for positive in [true, false] {
            let count = cubes
                .iter()
                .filter(|c| c.literals().any(|l| l == (var, positive)))
                .count();
            if count >= 2 && best.is_none_or(|(_, c)| count > c) {
                best = Some(((var, positive), count));
            }
        }
    }
    let Some(((var, positive), _)) = best else {
        return build_sop(aig, levels, cubes, leaves);
    };

    let (divided, rest): (Vec<Cube>, Vec<Cube>) = cubes
        .iter()
        .copied()
        .partition(|c| c.literals().any(|l| l == (var, positive)));
    let quotient: Vec<Cube> = divided
        .into_iter()
        .map(|mut c| {
            c.remove_literal(var);
            c
        })
        .collect();
    let q = build_factored(aig, levels, &quotient, leaves);
    let product = levels.create_and(aig, leaves[var] ^ !positive, q);
    if rest.is_empty() {
        return product;
    }
    let r = build_factored(aig, levels, &rest, leaves);
    levels.create_or(aig, product, r)
}

/// Factored irredundant SOP of `tt`, or of its complement when `complement_phase` is set.
pub fn build_isop(
    aig: &mut Aig,
    levels: &mut LevelTracker,
    tt: &TruthTable,
    leaves: &[Signal],
    complement_phase: bool,
) -> Signal {
    if complement_phase {
        let off = !tt;
        let cubes = isop(&off, &TruthTable::const0(off.num_vars()));
        !build_factored(aig, levels, &cubes, leaves)
    } else {
        let cubes = isop(tt, &TruthTable::const0(tt.num_vars()));
        build_factored(aig, levels, &cubes, leaves)
    }
}

/// Balanced ISOP (no factoring), used when depth matters more than size.
pub fn build_balanced_isop(
    aig: &mut Aig,
    levels: &mut LevelTracker,
    tt: &TruthTable,
    leaves: &[Signal],
    complement_phase: bool,
) -> Signal {
    if complement_phase {
        let off = !tt;
        let cubes = isop(&off, &TruthTable::const0(off.num_vars()));
        !build_sop(aig, levels, &cubes, leaves)
    } else {
        let cubes = isop(tt, &TruthTable::const0(tt.num_vars()));
        build_sop(aig, levels, &cubes, leaves)
    }
}

pub fn build_balanced_esop(aig: &mut Aig, levels: &mut LevelTracker, tt: &TruthTable, leaves: &[Signal]) -> Signal {
    build_esop(aig, levels, &esop(tt), leaves)
}

/// Recognizes constants and single literals.
fn trivial_function(tt: &TruthTable, leaves: &[Signal]) -> Option<Signal> {
    if tt.is_const0() {
        return Some(Signal::FALSE);
    }
    if tt.is_const1() {
        return Some(Signal::TRUE);
    }
    let support = tt.support();
    if let [var] = support[..] {
        let x = TruthTable::nth_var(tt.num_vars(), var);
        return Some(leaves[var] ^ (*tt != x));
    }
    None
}

/// Shannon expansion on the last variable of the support.
pub fn build_shannon(aig: &mut Aig, levels: &mut LevelTracker, tt: &TruthTable, leaves: &[Signal]) -> Signal {
    if let Some(s) = trivial_function(tt, leaves) {
        return s;
    }
    let support = tt.support();
    let var = support[support.len() - 1];
    let x = leaves[var];
    let f0 = tt.cofactor0(var);
    let f1 = tt.cofactor1(var);
    if f0 == !&f1 {
        let g = build_shannon(aig, levels, &f0, leaves);
        return levels.create_xor(aig, x, g);
    }
    if f0.is_const0() {
        let g = build_shannon(aig, levels, &f1, leaves);
        return levels.create_and(aig, x, g);
    }
    if f1.is_const0() {
        let g = build_shannon(aig, levels, &f0, leaves);
        return levels.create_and(aig, !x, g);
    }
    if f0.is_const1() {
        let g = build_shannon(aig, levels, &f1, leaves);
        return levels.create_or(aig, !x, g);
    }
    if f1.is_const1() {
        let g = build_shannon(aig, levels, &f0, leaves);
        return levels.create_or(aig, x, g);
    }
    let g1 = build_shannon(aig, levels, &f1, leaves);
    let g0 = build_shannon(aig, levels, &f0, leaves);
    let t = levels.create_and(aig, x, g1);
    let e = levels.create_and(aig, !x, g0);
    levels.create_or(aig, t, e)
}

/// Extracts the variables the function is linear in (`f = x ^ g`), then factors the rest.
pub fn build_xor_decomposition(
    aig: &mut Aig,
    levels: &mut LevelTracker,
    tt: &TruthTable,
    leaves: &[Signal],
) -> Signal {
    if let Some(s) = trivial_function(tt, leaves) {
        return s;
    }
    for var in tt.support() {
        let f0 = tt.cofactor0(var);
        if *tt == &f0 ^ &TruthTable::nth_var(tt.num_vars(), var) {
            let g = build_xor_decomposition(aig, levels, &f0, leaves);
            return levels.create_xor(aig, leaves[var], g);
        }
    }
    let direct = isop(tt, &TruthTable::const0(tt.num_vars()));
    let complement = isop(&!tt, &TruthTable::const0(tt.num_vars()));
    let literals = |cubes: &[Cube]| cubes.iter().map(Cube::num_literals).sum::<usize>();
    if literals(&complement) < literals(&direct) {
        !build_factored(aig, levels, &complement, leaves)
    } else {
        build_factored(aig, levels, &direct, leaves)
    }
}
