//! SAT formulas in conjunctive normal form, built from the gates of an AIG.
//!
//! To prove combinational equivalence between two circuits `a` and `b`:
//! - build the miter of `a` and `b` with [`Miter::new`]
//! - extract the CNF of its outputs with [`Miter::to_cnf`]
//! - check that the CNF is **UNSAT** with a SAT solver.
//!
//! If the resulting CNF is SAT, the two circuits are **not equivalent**, and the model is a
//! counterexample. This is implemented in [`crate::equivalence`].
//!
//! [`Miter::new`]: crate::miter::Miter::new
//! [`Miter::to_cnf`]: crate::miter::Miter::to_cnf

use std::{collections::HashMap, num::TryFromIntError, ops::Not};

use varisat::ExtendFormula;

use crate::{Aig, AigNode, NodeId, Result, Signal, miter::MiterError};

/// A SAT literal, as a non-zero DIMACS integer.
///
/// Note that not every AIG node corresponds to a SAT literal.
/// The constant node does not map to any literal: false literals are dropped from clauses,
/// and clauses containing a true literal (a complemented edge to the constant) are
/// satisfied and not emitted.
///
/// These cases are handled by the internal `LitRes` data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Lit {
    /// The DIMACS variable of the literal.
    pub fn var(self) -> i64 {
        self.0.abs()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    fn to_varisat(self) -> varisat::Lit {
        varisat::Lit::from_dimacs(self.0 as isize)
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<i64> for Lit {
    fn from(value: i64) -> Self {
        if value == 0 {
            panic!("Tried to create a Lit from 0. 0 is not a valid literal in DIMACS format.");
        }
        Lit(value)
    }
}

impl TryFrom<NodeId> for Lit {
    type Error = TryFromIntError;

    fn try_from(value: NodeId) -> std::result::Result<Self, Self::Error> {
        Ok(Lit::from(i64::try_from(value)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

impl From<Lit> for LitRes {
    fn from(value: Lit) -> Self {
        LitRes::Lit(value)
    }
}

/// SAT literal of an AIG signal, complement applied.
pub(crate) fn signal_lit(signal: Signal, litmap: &HashMap<NodeId, Lit>) -> Result<LitRes> {
    let lit = if signal.node() == 0 {
        LitRes::False
    } else {
        let node = signal.node();
        LitRes::from(*litmap.get(&node).ok_or(MiterError::UnmappedNodeToLit(node))?)
    };
    Ok(if signal.is_complemented() { !lit } else { lit })
}

/// A SAT clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause(Vec<Lit>);

impl Clause {
    /// A new empty clause.
    pub fn new() -> Self {
        Clause(Vec::new())
    }

    pub fn literals(&self) -> &[Lit] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the true SAT clause once we got rid of `True` and `False` literals.
    /// If there is a `True`, then the clause is satisfied, so we return None.
    /// `False` literals are omitted: a clause made only of them is empty, hence
    /// unsatisfiable, and is kept.
    fn from_lit_res(lits: Vec<LitRes>) -> Option<Clause> {
        let mut literals = Vec::new();

        for lit_res in lits {
            match lit_res {
                LitRes::True => return None,
                LitRes::False => (),
                LitRes::Lit(lit) => literals.push(lit),
            }
        }
        Some(Clause(literals))
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// A SAT CNF that can be passed to a SAT solver.
///
/// It provides the methods needed to finish a miter: [`add_xor`],
/// [`add_xor_whose_output_is_true`] and [`add_or_whose_output_is_true`].
///
/// [`add_xor`]: Cnf::add_xor
/// [`add_xor_whose_output_is_true`]: Cnf::add_xor_whose_output_is_true
/// [`add_or_whose_output_is_true`]: Cnf::add_or_whose_output_is_true
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf(Vec<Clause>);

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf(Vec::new())
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True iff the CNF holds the empty clause.
    pub fn is_trivially_unsat(&self) -> bool {
        self.0.iter().any(Clause::is_empty)
    }

    /// Add the given clause to the CNF.
    pub fn add_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Add the given clause to the CNF, else does nothing.
    pub fn add_clause_if(&mut self, clause: Option<Clause>) {
        if let Some(c) = clause {
            self.add_clause(c);
        }
    }

    /// Add the Tseitin clauses of `node`, a node of `aig`.
    pub fn add_clauses_node(&mut self, aig: &Aig, node: NodeId, litmap: &HashMap<NodeId, Lit>) -> Result<()> {
        match aig.node(node) {
            Some(AigNode::And([fanin0, fanin1])) => {
                let a = signal_lit(*fanin0, litmap)?;
                let b = signal_lit(*fanin1, litmap)?;
                let z = signal_lit(Signal::from_node(node), litmap)?;

                self.add_clause_if(Clause::from_lit_res(vec![a, !z]));
                self.add_clause_if(Clause::from_lit_res(vec![b, !z]));
                self.add_clause_if(Clause::from_lit_res(vec![!a, !b, z]));
            }
            // Inputs and register outputs are free variables
            _ => (),
        }
        Ok(())
    }

    /// Add clauses that encode `z = XOR(a, b)`.
    pub fn add_xor(&mut self, a: Lit, b: Lit, z: Lit) {
        self.add_clause(Clause::from(vec![a, b, !z]));
        self.add_clause(Clause::from(vec![a, !b, z]));
        self.add_clause(Clause::from(vec![!a, b, z]));
        self.add_clause(Clause::from(vec![!a, !b, !z]));
    }

    /// Add clauses that encode `XOR(a, b) = true`.
    pub fn add_xor_whose_output_is_true(&mut self, a: Lit, b: Lit) {
        self.add_clause(Clause::from(vec![a, b]));
        self.add_clause(Clause::from(vec![!a, !b]));
    }

    /// Add clauses that encode `OR(inputs) = true`.
    ///
    /// This is the last clause of a miter: at least one pair of outputs differs.
    /// - if this is possible (ie the CNF is SAT), then circuits are not equivalent
    /// - if the CNF is UNSAT, then circuits are equivalent.
    pub fn add_or_whose_output_is_true(&mut self, inputs: Vec<Lit>) {
        self.add_clause(Clause::from(inputs));
    }

    pub(crate) fn add_or_of_signals(&mut self, inputs: Vec<LitRes>) {
        self.add_clause_if(Clause::from_lit_res(inputs));
    }

    /// Solves the CNF with varisat. Returns the positive variables of a model, or `None`
    /// when the CNF is UNSAT.
    pub fn solve(&self) -> Result<Option<Vec<i64>>> {
        if self.is_trivially_unsat() {
            return Ok(None);
        }
        let mut solver = varisat::Solver::new();
        for clause in &self.0 {
            let lits: Vec<varisat::Lit> = clause.literals().iter().map(|l| l.to_varisat()).collect();
            solver.add_clause(&lits);
        }
        let sat = solver
            .solve()
            .map_err(|e| crate::AigError::Solver(format!("{e:?}")))?;
        if !sat {
            return Ok(None);
        }
        let model = solver.model().unwrap_or_default();
        Ok(Some(
            model
                .into_iter()
                .filter(|l| l.is_positive())
                .map(|l| l.to_dimacs() as i64)
                .collect(),
        ))
    }
}
