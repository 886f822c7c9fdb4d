//! Miters between two AIGs.
//!
//! For background on what is a miter, please check
//! [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.
//!
//! Both AIGs are copied into one structurally hashed AIG on shared inputs, and every pair of
//! combinational outputs is XORed into an output of the miter. Structural hashing already
//! merges the identical parts, so outputs that became constant false are proven.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    Aig, NodeId, Result, Signal,
    cnf::{Cnf, Lit, signal_lit},
    dfs::{cone, topological_order},
};

/// Error returned when an operation related to the miter fails
/// (creation, combinational equivalence checking, ...).
#[derive(Debug, Error)]
pub enum MiterError {
    /// Creation of a miter failed because the two AIGs have different numbers of
    /// combinational inputs.
    #[error("AIGs have different inputs : {0} vs {1}")]
    DifferentInputs(usize, usize),

    /// Creation of a miter failed because the two AIGs have different numbers of
    /// combinational outputs.
    #[error("AIGs have different outputs : {0} vs {1}")]
    DifferentOutputs(usize, usize),

    /// A node was not mapped to any SAT literal in the miter.
    #[error("node id {0} is not mapped to any literal")]
    UnmappedNodeToLit(NodeId),
}

/// The miter of two AIGs with the same interface.
///
/// The combinational inputs (primary inputs then register outputs) of the miter are the
/// shared inputs, in order. Output `i` of the miter is true exactly when output `i` of the
/// two AIGs differ.
#[derive(Debug, Clone)]
pub struct Miter {
    aig: Aig,
}

/// Copies the combinational logic of `source` into `dest` over `inputs`, and returns the
/// signals of the combinational outputs of `source`.
fn copy_logic(dest: &mut Aig, source: &Aig, inputs: &[Signal]) -> Result<Vec<Signal>> {
    let mut map: Vec<Option<Signal>> = vec![None; source.size()];
    map[0] = Some(Signal::FALSE);
    for (ci, &input) in source.cis().zip(inputs) {
        map[ci] = Some(input);
    }
    let lookup = |map: &[Option<Signal>], s: Signal| {
        map[s.node()]
            .map(|m| m ^ s.is_complemented())
            .ok_or(MiterError::UnmappedNodeToLit(s.node()))
    };
    for gate in topological_order(source)? {
        let fanins = source
            .fanins(gate)
            .iter()
            .map(|&f| lookup(&map, f))
            .collect::<std::result::Result<Vec<Signal>, MiterError>>()?;
        map[gate] = Some(dest.clone_node(source, gate, &fanins)?);
    }
    let outputs = source
        .cos()
        .map(|co| lookup(&map, co))
        .collect::<std::result::Result<Vec<Signal>, MiterError>>()?;
    Ok(outputs)
}

impl Miter {
    /// Create the miter of two AIGs.
    ///
    /// This will fail if the AIGs have different numbers of combinational inputs or of
    /// combinational outputs.
    pub fn new(a: &Aig, b: &Aig) -> Result<Self> {
        if a.num_cis() != b.num_cis() {
            return Err(MiterError::DifferentInputs(a.num_cis(), b.num_cis()).into());
        }
        if a.num_cos() != b.num_cos() {
            return Err(MiterError::DifferentOutputs(a.num_cos(), b.num_cos()).into());
        }

        let mut aig = Aig::new();
        let inputs: Vec<Signal> = (0..a.num_cis()).map(|_| aig.create_pi()).collect();
        let outputs_a = copy_logic(&mut aig, a, &inputs)?;
        let outputs_b = copy_logic(&mut aig, b, &inputs)?;
        for (oa, ob) in outputs_a.into_iter().zip(outputs_b) {
            let diff = aig.create_xor(oa, ob);
            aig.create_po(diff);
        }
        aig.cleanup_dangling()?;
        Ok(Miter { aig })
    }

    /// The miter itself.
    pub fn aig(&self) -> &Aig {
        &self.aig
    }

    pub fn num_outputs(&self) -> usize {
        self.aig.num_pos()
    }

    /// Outputs that structural hashing did not reduce to constant false.
    pub fn pending_outputs(&self) -> Vec<usize> {
        self.aig
            .pos()
            .enumerate()
            .filter(|(_, po)| *po != Signal::FALSE)
            .map(|(i, _)| i)
            .collect()
    }

    /// True iff every output was discharged structurally.
    pub fn is_structurally_equivalent(&self) -> bool {
        self.pending_outputs().is_empty()
    }

    /// CNF stating that one of `outputs` is true, with the literal of every node.
    ///
    /// Input `i` of the miter is DIMACS variable `i + 1`.
    pub fn to_cnf(&self, outputs: &[usize]) -> Result<(Cnf, HashMap<NodeId, Lit>)> {
        let mut litmap: HashMap<NodeId, Lit> = HashMap::new();
        for (i, ci) in self.aig.cis().enumerate() {
            litmap.insert(ci, Lit::from(i as i64 + 1));
        }
        let mut next_lit = self.aig.num_cis() as i64 + 1;

        let signals = outputs
            .iter()
            .map(|&i| self.aig.po_at(i))
            .collect::<Result<Vec<Signal>>>()?;
        let mut cnf = Cnf::new();
        let mut seen: Vec<bool> = vec![false; self.aig.size()];
        for signal in &signals {
            for gate in cone(&self.aig, signal.node(), &[]) {
                if seen[gate] {
                    continue;
                }
                seen[gate] = true;
                litmap.insert(gate, Lit::from(next_lit));
                next_lit += 1;
                cnf.add_clauses_node(&self.aig, gate, &litmap)?;
            }
        }
        let lits = signals
            .iter()
            .map(|&s| signal_lit(s, &litmap))
            .collect::<Result<Vec<_>>>()?;
        cnf.add_or_of_signals(lits);
        Ok((cnf, litmap))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::AigError;

    #[test]
    fn interface_mismatch_test() {
        let mut a = Aig::new();
        let x = a.create_pi();
        a.create_po(x);
        let mut b = Aig::new();
        let y = b.create_pi();
        b.create_pi();
        b.create_po(y);
        assert!(matches!(
            Miter::new(&a, &b),
            Err(AigError::Miter(MiterError::DifferentInputs(1, 2)))
        ));

        a.create_pi();
        a.create_po(x);
        assert!(matches!(
            Miter::new(&a, &b),
            Err(AigError::Miter(MiterError::DifferentOutputs(2, 1)))
        ));
    }

    #[test]
    fn structural_discharge_test() {
        let mut a = Aig::new();
        let x = a.create_pi();
        let y = a.create_pi();
        let f = a.create_and(x, !y);
        a.create_po(f);

        let mut b = Aig::new();
        let x = b.create_pi();
        let y = b.create_pi();
        let f = b.create_and(!y, x);
        b.create_po(f);

        let miter = Miter::new(&a, &b).unwrap();
        assert_eq!(miter.num_outputs(), 1);
        assert!(miter.is_structurally_equivalent());
        assert_eq!(miter.aig().num_gates(), 0);
    }

    #[test]
    fn pending_output_test() {
        let mut a = Aig::new();
        let x = a.create_pi();
        let y = a.create_pi();
        let f = a.create_and(x, y);
        a.create_po(f);
        a.create_po(x);

        let mut b = Aig::new();
        let x = b.create_pi();
        let y = b.create_pi();
        let n = b.create_and(!x, !y);
        let f = b.create_and(x, !n);
        let f = b.create_and(f, y);
        b.create_po(f);
        b.create_po(x);

        let miter = Miter::new(&a, &b).unwrap();
        assert_eq!(miter.pending_outputs(), vec![0]);
        let (cnf, litmap) = miter.to_cnf(&[0]).unwrap();
        assert_eq!(litmap[&miter.aig().cis().next().unwrap()], Lit::from(1));
        // x & y versus a redundant x & y: no difference exists
        assert_eq!(cnf.solve().unwrap(), None);
    }
}
