use thiserror::Error;

use crate::{index_list::IndexListError, miter::MiterError, truth_table::TruthTableError};

use super::{NodeId, Signal};

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// The node with given id does not exist (or has been taken out).
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// There is no primary output with this index.
    #[error("primary output index {0} is out of range")]
    PoIndexOutOfRange(usize),

    /// There is no primary input with this index.
    #[error("primary input index {0} is out of range")]
    PiIndexOutOfRange(usize),

    /// There is no register with this index.
    #[error("register index {0} is out of range")]
    RegisterIndexOutOfRange(usize),

    /// The operation needs an AND gate.
    #[error("node with id={0} is not an AND gate")]
    NotAGate(NodeId),

    /// A gate was replayed with the wrong number of fanins.
    #[error("expected {expected} fanins, found {found}")]
    FaninCountMismatch { expected: usize, found: usize },

    /// The replacement signal depends on the node it would replace.
    #[error("substituting node with id={0} by {1} would create a cycle")]
    CyclicSubstitution(NodeId, Signal),

    /// A parameter is outside the range the algorithm supports.
    #[error("parameter {name} is {value}, at most {max} is supported")]
    ParameterOutOfRange { name: &'static str, value: usize, max: usize },

    /// An input assignment does not match the number of inputs.
    #[error("expected {expected} input values, found {found}")]
    WrongInputCount { expected: usize, found: usize },

    /// The balancing pass only knows `sop` and `esop`.
    #[error("Unknown rebalance function: '{0}'. Possible values are 'sop' and 'esop'.")]
    UnknownRebalanceFunction(String),

    /// The operation is only defined for combinational AIGs, or the register pairing is broken.
    #[error("sequential AIG not supported here: {0}")]
    Sequential(String),

    /// A serialized snapshot could not be turned back into an AIG.
    #[error("malformed AIG snapshot: {0}")]
    Snapshot(String),

    /// The SAT solver failed.
    #[error("SAT solver error: {0}")]
    Solver(String),

    /// The AIG has reached an invalid state. This should never happen.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`TruthTableError`].
    #[error("{0}")]
    TruthTable(#[from] TruthTableError),

    /// Just forwarding an [`IndexListError`].
    #[error("{0}")]
    IndexList(#[from] IndexListError),

    /// Just forwarding a [`MiterError`].
    #[error("{0}")]
    Miter(#[from] MiterError),
}
