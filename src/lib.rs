//! And-Inverter Graphs with structural hashing, simulation, rewriting passes and
//! combinational equivalence checking.
//!
//! ```rust
//! use aigsynth::{Aig, simulation::simulate};
//! let mut aig = Aig::new();
//! let a = aig.create_pi();
//! let b = aig.create_pi();
//! let c = aig.create_pi();
//! let f = aig.create_maj(a, b, c);
//! aig.create_po(f);
//! assert_eq!(simulate(&aig)[0].to_hex(), "e8");
//! ```

pub mod aig;
pub mod balancing;
pub mod cnf;
pub mod cut;
pub mod depth;
pub mod dfs;
pub mod equivalence;
pub mod index_list;
pub mod miter;
pub mod refactoring;
pub mod replacement;
pub mod resubstitution;
pub mod resynthesis;
pub mod rewriting;
pub mod simulation;
pub mod truth_table;
pub mod window;

// Re-exporting symbols and modules.
pub use aig::{Aig, AigError, AigNode, NodeId, Register, Result, Signal};
pub use index_list::IndexList;
pub use truth_table::TruthTable;
