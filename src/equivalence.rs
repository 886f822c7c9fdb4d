//! Combinational equivalence checking.
//!
//! The miter of the two AIGs is built first, which discharges the outputs that structural
//! hashing merges. Random simulation then looks for a cheap counterexample, and the
//! remaining outputs are handed to varisat: UNSAT means equivalent.

use log::{debug, info};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{
    Aig, Result,
    miter::Miter,
    simulation::{simulate_words, word_value},
};

/// Rounds of 64 random patterns simulated before calling the solver.
const SIMULATION_ROUNDS: usize = 16;
const SEED: u64 = 0x5eed_a16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceParams {
    /// Looks for counterexamples by random simulation before calling the solver.
    pub functional_reduction: bool,
    pub verbose: bool,
}

impl Default for EquivalenceParams {
    fn default() -> Self {
        EquivalenceParams {
            functional_reduction: true,
            verbose: false,
        }
    }
}

/// Returns true iff `spec` and `implementation` compute the same combinational outputs.
///
/// Fails when the two AIGs do not have the same numbers of combinational inputs and outputs.
///
/// ```rust
/// use aigsynth::{Aig, equivalence::{EquivalenceParams, equivalence_checking}};
/// let mut spec = Aig::new();
/// let a = spec.create_pi();
/// let b = spec.create_pi();
/// let f = spec.create_xor(a, b);
/// spec.create_po(f);
///
/// let mut implementation = Aig::new();
/// let a = implementation.create_pi();
/// let b = implementation.create_pi();
/// let or = implementation.create_or(a, b);
/// let nand = implementation.create_nand(a, b);
/// let f = implementation.create_and(or, nand);
/// implementation.create_po(f);
///
/// let params = EquivalenceParams::default();
/// assert!(equivalence_checking(&spec, &implementation, &params).unwrap());
/// ```
pub fn equivalence_checking(spec: &Aig, implementation: &Aig, params: &EquivalenceParams) -> Result<bool> {
    Ok(find_counterexample(spec, implementation, params)?.is_none())
}

/// Returns an assignment of the combinational inputs under which `spec` and
/// `implementation` differ, if any.
pub fn find_counterexample(
    spec: &Aig,
    implementation: &Aig,
    params: &EquivalenceParams,
) -> Result<Option<Vec<bool>>> {
    let miter = Miter::new(spec, implementation)?;
    let pending = miter.pending_outputs();
    debug!(
        "equivalence: {} of {} outputs left after structural hashing",
        pending.len(),
        miter.num_outputs()
    );
    if pending.is_empty() {
        if params.verbose {
            info!("equivalence: proven by structural hashing");
        }
        return Ok(None);
    }

    if params.functional_reduction {
        if let Some(cex) = random_simulation(miter.aig(), &pending)? {
            if params.verbose {
                info!("equivalence: counterexample found by simulation");
            }
            return Ok(Some(cex));
        }
    }

    let (cnf, _) = miter.to_cnf(&pending)?;
    debug!("equivalence: solving {} clauses", cnf.len());
    let Some(model) = cnf.solve()? else {
        if params.verbose {
            info!("equivalence: proven by SAT");
        }
        return Ok(None);
    };
    let cex = (0..miter.aig().num_cis())
        .map(|i| model.contains(&(i as i64 + 1)))
        .collect();
    if params.verbose {
        info!("equivalence: counterexample found by SAT");
    }
    Ok(Some(cex))
}

/// Simulates random patterns on the miter and returns the first one setting a pending
/// output.
fn random_simulation(miter: &Aig, pending: &[usize]) -> Result<Option<Vec<bool>>> {
    let mut rng = Pcg64Mcg::seed_from_u64(SEED);
    let outputs: Vec<_> = pending
        .iter()
        .map(|&i| miter.po_at(i))
        .collect::<Result<Vec<_>>>()?;
    for _ in 0..SIMULATION_ROUNDS {
        let words: Vec<u64> = (0..miter.num_cis()).map(|_| rng.next_u64()).collect();
        let values = simulate_words(miter, &words)?;
        let hits = outputs.iter().fold(0u64, |acc, &o| acc | word_value(&values, o));
        if hits != 0 {
            let bit = hits.trailing_zeros();
            return Ok(Some(words.iter().map(|w| (w >> bit) & 1 == 1).collect()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{AigError, miter::MiterError, simulation::simulate_pattern};

    fn xor_pair() -> (Aig, Aig) {
        let mut spec = Aig::new();
        let a = spec.create_pi();
        let b = spec.create_pi();
        let f = spec.create_xor(a, b);
        spec.create_po(f);

        let mut implementation = Aig::new();
        let a = implementation.create_pi();
        let b = implementation.create_pi();
        let or = implementation.create_or(a, b);
        let nand = implementation.create_nand(a, b);
        let f = implementation.create_and(or, nand);
        implementation.create_po(f);
        (spec, implementation)
    }

    #[test]
    fn equivalent_test() {
        let (spec, implementation) = xor_pair();
        for functional_reduction in [false, true] {
            let params = EquivalenceParams {
                functional_reduction,
                verbose: true,
            };
            assert!(equivalence_checking(&spec, &implementation, &params).unwrap());
        }
    }

    #[test]
    fn negated_output_test() {
        let (spec, mut implementation) = xor_pair();
        let po = implementation.po_at(0).unwrap();
        implementation.create_po(!po);
        let mut spec = spec;
        let po = spec.po_at(0).unwrap();
        spec.create_po(po);
        for functional_reduction in [false, true] {
            let params = EquivalenceParams {
                functional_reduction,
                verbose: false,
            };
            let cex = find_counterexample(&spec, &implementation, &params).unwrap().unwrap();
            assert_ne!(
                simulate_pattern(&spec, &cex).unwrap(),
                simulate_pattern(&implementation, &cex).unwrap()
            );
        }
    }

    #[test]
    fn rare_difference_test() {
        // and of 12 inputs versus const0: only one pattern out of 4096 differs
        let mut spec = Aig::new();
        let pis: Vec<_> = (0..12).map(|_| spec.create_pi()).collect();
        let f = spec.create_nary_and(&pis);
        spec.create_po(f);
        let mut implementation = Aig::new();
        for _ in 0..12 {
            implementation.create_pi();
        }
        implementation.create_po(crate::Signal::FALSE);

        let cex = find_counterexample(&spec, &implementation, &EquivalenceParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(cex, vec![true; 12]);
    }

    #[test]
    fn mismatch_test() {
        let (spec, mut implementation) = xor_pair();
        implementation.create_pi();
        let err = equivalence_checking(&spec, &implementation, &EquivalenceParams::default()).unwrap_err();
        assert!(matches!(err, AigError::Miter(MiterError::DifferentInputs(2, 3))));
    }

    #[test]
    fn empty_test() {
        let params = EquivalenceParams::default();
        assert!(equivalence_checking(&Aig::new(), &Aig::new(), &params).unwrap());
    }
}
