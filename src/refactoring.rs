//! SOP refactoring.
//!
//! The cone of every gate is collapsed into a truth table over its leaves and rebuilt as a
//! factored irredundant sum of products, in the phase giving the smaller structure.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::{
    Aig, NodeId, Result, Signal,
    dfs::{all_gates_topological, mffc, reconvergence_cut},
    index_list::IndexList,
    replacement::{Evaluation, evaluate, splice, structure_from},
    resynthesis::{LevelTracker, build_factored},
    truth_table::{TruthTable, check_width, isop},
    window::{care_set, cone_function},
};

/// Window size used to compute the don't-cares of a cone.
const DONT_CARE_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefactoringParams {
    /// Largest number of leaves of a collapsed cone.
    pub max_pis: usize,
    pub allow_zero_gain: bool,
    /// Collapses a reconvergence-driven cut instead of the MFFC.
    pub use_reconvergence_cut: bool,
    pub use_dont_cares: bool,
    pub verbose: bool,
}

impl Default for RefactoringParams {
    fn default() -> Self {
        RefactoringParams {
            max_pis: 6,
            allow_zero_gain: false,
            use_reconvergence_cut: false,
            use_dont_cares: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringStats {
    pub gates_before: usize,
    pub gates_after: usize,
    pub roots: usize,
    pub refactored: usize,
    pub estimated_gain: usize,
}

/// Inputs of the MFFC of `root`, sorted.
fn mffc_leaves(aig: &Aig, root: NodeId) -> Vec<NodeId> {
    let cone = mffc(aig, root, &[]);
    let mut leaves: Vec<NodeId> = cone
        .iter()
        .flat_map(|&n| aig.fanins(n).iter().map(|f| f.node()))
        .filter(|n| !cone.contains(n))
        .collect();
    leaves.sort_unstable();
    leaves.dedup();
    leaves
}

fn window_leaves(aig: &Aig, root: NodeId, params: &RefactoringParams) -> Vec<NodeId> {
    if !params.use_reconvergence_cut {
        let leaves = mffc_leaves(aig, root);
        if leaves.len() <= params.max_pis {
            return leaves;
        }
    }
    reconvergence_cut(aig, root, params.max_pis)
}

/// Factored ISOP of `tt` (or of its complement) within `care`.
fn factored_structure(tt: &TruthTable, care: &TruthTable, complement_phase: bool) -> Result<IndexList> {
    let on = if complement_phase { !tt } else { tt.clone() };
    let cubes = isop(&(on & care), &!care);
    structure_from(tt.num_vars(), |aig, levels, leaves| {
        build_factored(aig, levels, &cubes, leaves) ^ complement_phase
    })
}

/// Refactors `aig` in place (as an atomic pass).
///
/// ```rust
/// use aigsynth::{Aig, refactoring::{RefactoringParams, sop_refactoring}};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let c = aig.create_pi();
/// let ab = aig.create_and(a, b);
/// let ac = aig.create_and(a, c);
/// let f = aig.create_or(ab, ac);
/// aig.create_po(f);
/// sop_refactoring(&mut aig, &RefactoringParams::default()).unwrap();
/// assert_eq!(aig.num_gates(), 2);
/// ```
pub fn sop_refactoring(aig: &mut Aig, params: &RefactoringParams) -> Result<RefactoringStats> {
    check_width("max_pis", params.max_pis)?;
    let mut work = aig.clone();
    let mut stats = RefactoringStats {
        gates_before: work.num_gates(),
        ..RefactoringStats::default()
    };
    let mut levels = LevelTracker::new(&work);

    for root in all_gates_topological(&work)? {
        if work.is_dead(root) {
            continue;
        }
        stats.roots += 1;
        let leaves = window_leaves(&work, root, params);
        if leaves.len() > params.max_pis {
            continue;
        }
        let tt = cone_function(&work, root, &leaves);
        let care = if params.use_dont_cares {
            care_set(&work, &leaves, DONT_CARE_WINDOW)
        } else {
            TruthTable::const1(leaves.len())
        };
        let inputs: Vec<Signal> = leaves.iter().map(|&l| Signal::from_node(l)).collect();

        let mut best: Option<(IndexList, Evaluation)> = None;
        for complement_phase in [false, true] {
            let structure = factored_structure(&tt, &care, complement_phase)?;
            let Some(eval) = evaluate(&work, &levels, &structure, &inputs, root, &leaves) else {
                continue;
            };
            let better = best
                .as_ref()
                .is_none_or(|(_, b)| (eval.gain, std::cmp::Reverse(eval.level)) > (b.gain, std::cmp::Reverse(b.level)));
            if better {
                best = Some((structure, eval));
            }
        }
        let Some((structure, eval)) = best else {
            continue;
        };
        if eval.gain < 0 || (eval.gain == 0 && !params.allow_zero_gain) {
            continue;
        }
        trace!("root {root}: {} leaves, gain {}", leaves.len(), eval.gain);
        if splice(&mut work, &structure, &inputs, false, root)? {
            stats.refactored += 1;
            stats.estimated_gain += eval.gain as usize;
            levels.sync(&work);
        }
    }

    work.cleanup_dangling()?;
    stats.gates_after = work.num_gates();
    if params.verbose {
        info!(
            "refactoring: {} cones refactored, {} -> {} gates",
            stats.refactored, stats.gates_before, stats.gates_after
        );
    }
    debug!("refactoring: {stats:?}");
    *aig = work;
    Ok(stats)
}
