//! Irredundant sum-of-products covers (Minato-Morreale).

use super::TruthTable;

/// A product of literals over at most 32 variables.
///
/// Variable `i` appears in the cube iff bit `i` of `mask` is set; it appears positive iff
/// bit `i` of `polarity` is also set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cube {
    pub mask: u32,
    pub polarity: u32,
}

impl Cube {
    /// The empty cube, which is the constant true product.
    pub fn tautology() -> Self {
        Cube::default()
    }

    pub fn num_literals(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn add_literal(&mut self, var: usize, positive: bool) {
        self.mask |= 1 << var;
        if positive {
            self.polarity |= 1 << var;
        } else {
            self.polarity &= !(1 << var);
        }
    }

    pub fn remove_literal(&mut self, var: usize) {
        self.mask &= !(1 << var);
        self.polarity &= !(1 << var);
    }

    /// Literals of the cube as `(variable, positive)` pairs, by increasing variable.
    pub fn literals(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        (0..32)
            .filter(|v| self.mask >> v & 1 == 1)
            .map(|v| (v, self.polarity >> v & 1 == 1))
    }

    pub fn to_truth_table(&self, num_vars: usize) -> TruthTable {
        self.literals()
            .fold(TruthTable::const1(num_vars), |acc, (var, positive)| {
                let literal = TruthTable::nth_var(num_vars, var);
                if positive { acc & literal } else { acc & !literal }
            })
    }
}

/// Computes an irredundant cover of `on`, using `dc` as don't-cares.
///
/// The cover contains every minterm of `on & !dc` and no minterm outside `on | dc`.
///
/// ```rust
/// use aigsynth::truth_table::{TruthTable, isop};
/// let f = TruthTable::from_hex_str(3, "e8").unwrap();
/// let cubes = isop(&f, &TruthTable::const0(3));
/// assert_eq!(cubes.len(), 3);
/// ```
pub fn isop(on: &TruthTable, dc: &TruthTable) -> Vec<Cube> {
    let lower = on & &!dc;
    let upper = on | dc;
    let mut cubes = Vec::new();
    isop_rec(&lower, &upper, on.num_vars(), &mut cubes);
    cubes
}

fn isop_rec(lower: &TruthTable, upper: &TruthTable, num_vars: usize, cubes: &mut Vec<Cube>) -> TruthTable {
    let n = lower.num_vars();
    if lower.is_const0() {
        return TruthTable::const0(n);
    }
    if upper.is_const1() {
        cubes.push(Cube::tautology());
        return TruthTable::const1(n);
    }
    let Some(var) = (0..num_vars)
        .rev()
        .find(|&v| lower.has_var(v) || upper.has_var(v))
    else {
        // unreachable with lower <= upper, kept total
        cubes.push(Cube::tautology());
        return TruthTable::const1(n);
    };

    let lower0 = lower.cofactor0(var);
    let lower1 = lower.cofactor1(var);
    let upper0 = upper.cofactor0(var);
    let upper1 = upper.cofactor1(var);

    let begin0 = cubes.len();
    let res0 = isop_rec(&(&lower0 & &!&upper1), &upper0, var, cubes);
    let end0 = cubes.len();
    let res1 = isop_rec(&(&lower1 & &!&upper0), &upper1, var, cubes);
    let end1 = cubes.len();
    let rest = (&lower0 & &!&res0) | (&lower1 & &!&res1);
    let res2 = isop_rec(&rest, &(&upper0 & &upper1), var, cubes);

    for cube in &mut cubes[begin0..end0] {
        cube.add_literal(var, false);
    }
    for cube in &mut cubes[end0..end1] {
        cube.add_literal(var, true);
    }

    let x = TruthTable::nth_var(n, var);
    res2 | (&res0 & &!&x) | (&res1 & &x)
}

/// Evaluates a cover as a truth table.
pub fn cover_to_truth_table(cubes: &[Cube], num_vars: usize) -> TruthTable {
    cubes
        .iter()
        .fold(TruthTable::const0(num_vars), |acc, cube| acc | cube.to_truth_table(num_vars))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn cube_test() {
        let mut cube = Cube::tautology();
        cube.add_literal(0, true);
        cube.add_literal(2, false);
        assert_eq!(cube.num_literals(), 2);
        assert_eq!(cube.literals().collect::<Vec<_>>(), vec![(0, true), (2, false)]);
        assert_eq!(cube.to_truth_table(3).to_binary(), "00001010");
        cube.remove_literal(0);
        assert_eq!(cube.to_truth_table(3).to_hex(), "0f");
    }

    #[test]
    fn isop_majority_test() {
        let f = TruthTable::majority(3);
        let cubes = isop(&f, &TruthTable::const0(3));
        assert_eq!(cubes.len(), 3);
        assert!(cubes.iter().all(|c| c.num_literals() == 2));
        assert_eq!(cover_to_truth_table(&cubes, 3), f);
    }

    #[test]
    fn isop_constants_test() {
        assert!(isop(&TruthTable::const0(4), &TruthTable::const0(4)).is_empty());
        assert_eq!(
            isop(&TruthTable::const1(4), &TruthTable::const0(4)),
            vec![Cube::tautology()]
        );
    }

    #[test]
    fn isop_random_test() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        for num_vars in 1..=8 {
            let f = TruthTable::random(num_vars, &mut rng);
            let cubes = isop(&f, &TruthTable::const0(num_vars));
            assert_eq!(cover_to_truth_table(&cubes, num_vars), f);
        }
    }

    #[test]
    fn isop_dont_cares_test() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        for _ in 0..20 {
            let f = TruthTable::random(5, &mut rng);
            let dc = &TruthTable::random(5, &mut rng) & &TruthTable::random(5, &mut rng);
            let cover = cover_to_truth_table(&isop(&f, &dc), 5);
            assert!((&f & &!&dc).implies(&cover));
            assert!(cover.implies(&(&f | &dc)));
        }
    }
}
