//! Exclusive sum-of-products covers from fixed-polarity Reed-Muller forms.

use super::{PROJECTIONS, TruthTable, isop::Cube};

/// Largest number of variables for which every polarity is tried.
const MAX_POLARITY_SEARCH: usize = 10;

/// Positive-polarity Reed-Muller coefficients (Möbius transform): bit `m` of the result
/// is set iff the product of the variables in `m` appears in the XOR expansion.
pub fn pprm(tt: &TruthTable) -> TruthTable {
    let mut result = tt.clone();
    let num_vars = tt.num_vars();
    for var in 0..num_vars.min(6) {
        let shift = 1 << var;
        for word in result.words_mut() {
            *word ^= (*word & !PROJECTIONS[var]) << shift;
        }
    }
    for var in 6..num_vars {
        let step = 1 << (var - 6);
        for block in result.words_mut().chunks_mut(2 * step) {
            let (low, high) = block.split_at_mut(step);
            for (h, l) in high.iter_mut().zip(low.iter()) {
                *h ^= *l;
            }
        }
    }
    result
}

fn cubes_of(coefficients: &TruthTable, negated: u32) -> Vec<Cube> {
    (0..coefficients.num_bits())
        .filter(|&m| coefficients.get_bit(m))
        .map(|m| Cube {
            mask: m as u32,
            polarity: m as u32 & !negated,
        })
        .collect()
}

/// XOR of cubes equal to `tt`, picked as the fixed-polarity Reed-Muller form with the
/// fewest cubes, then the fewest literals.
///
/// ```rust
/// use aigsynth::truth_table::{TruthTable, esop};
/// let x = (0..3).map(|i| TruthTable::nth_var(3, i)).collect::<Vec<_>>();
/// let parity = &(&x[0] ^ &x[1]) ^ &x[2];
/// assert_eq!(esop(&parity).len(), 3);
/// ```
pub fn esop(tt: &TruthTable) -> Vec<Cube> {
    let num_vars = tt.num_vars();
    let polarities: u32 = if num_vars <= MAX_POLARITY_SEARCH { 1 << num_vars } else { 1 };
    let mut best: Option<(usize, usize, Vec<Cube>)> = None;
    for negated in 0..polarities {
        let mut flipped = tt.clone();
        for var in 0..num_vars {
            if negated >> var & 1 == 1 {
                flipped = flipped.flip_var(var);
            }
        }
        let coefficients = pprm(&flipped);
        let terms = coefficients.count_ones();
        if best.as_ref().is_some_and(|(t, _, _)| terms > *t) {
            continue;
        }
        let cubes = cubes_of(&coefficients, negated);
        let literals = cubes.iter().map(Cube::num_literals).sum();
        if best
            .as_ref()
            .is_none_or(|(t, l, _)| (terms, literals) < (*t, *l))
        {
            best = Some((terms, literals, cubes));
        }
    }
    best.map(|(_, _, cubes)| cubes).unwrap_or_default()
}

/// Evaluates an XOR of cubes as a truth table.
pub fn esop_to_truth_table(cubes: &[Cube], num_vars: usize) -> TruthTable {
    cubes
        .iter()
        .fold(TruthTable::const0(num_vars), |acc, cube| acc ^ cube.to_truth_table(num_vars))
}
