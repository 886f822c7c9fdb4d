//! Cut rewriting.
//!
//! Every gate is visited in topological order. Each of its cuts with at most 4 leaves is
//! matched, through NPN canonization, against the library of small structures; the best
//! replacement is spliced in when it saves gates.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::{
    Aig, NodeId, Result, Signal,
    cut::{
        Cut, CutEnumerationParams, LazyCuts,
        library::RewritingLibrary,
        npn::{NpnCache, NpnTransform, expand_to_tt16},
    },
    dfs::all_gates_topological,
    index_list::IndexList,
    replacement::{evaluate, splice},
    resynthesis::LevelTracker,
    truth_table::TruthTable,
    window::care_set,
};

/// Largest cut the library can match.
const LIBRARY_INPUTS: usize = 4;

/// Window size used to compute the don't-cares of a cut.
const DONT_CARE_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutRewritingParams {
    pub cut_enumeration: CutEnumerationParams,
    /// Also accept replacements that neither save nor cost gates.
    pub allow_zero_gain: bool,
    pub use_dont_cares: bool,
    /// Cuts with fewer leaves are not considered.
    pub min_cand_cut_size: usize,
    /// Threshold used instead of `min_cand_cut_size` for nodes without any cut that large.
    pub min_cand_cut_size_override: Option<usize>,
    /// Rejects replacements that would raise the level of the root.
    pub preserve_depth: bool,
    pub verbose: bool,
    /// Logs every candidate.
    pub very_verbose: bool,
}

impl Default for CutRewritingParams {
    fn default() -> Self {
        CutRewritingParams {
            cut_enumeration: CutEnumerationParams::default(),
            allow_zero_gain: false,
            use_dont_cares: false,
            min_cand_cut_size: 3,
            min_cand_cut_size_override: None,
            preserve_depth: false,
            verbose: false,
            very_verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritingStats {
    pub gates_before: usize,
    pub gates_after: usize,
    pub roots: usize,
    pub candidates: usize,
    pub rewrites: usize,
    /// Sum of the gains of the accepted rewrites, before cleanup.
    pub estimated_gain: usize,
}

struct Candidate {
    structure: IndexList,
    inputs: Vec<Signal>,
    output_neg: bool,
    gain: isize,
}

/// Smallest cut size considered for a node with these cuts.
fn candidate_threshold(cuts: &[Cut], params: &CutRewritingParams) -> usize {
    if cuts.iter().any(|c| c.size() >= params.min_cand_cut_size) {
        return params.min_cand_cut_size;
    }
    params
        .min_cand_cut_size_override
        .unwrap_or(params.min_cand_cut_size)
}

/// Inputs of the canonical structure: input `i` is leaf `perm[i]`, negated as requested.
fn transform_inputs(leaves: &[NodeId], transform: &NpnTransform) -> Vec<Signal> {
    (0..LIBRARY_INPUTS)
        .map(|i| match leaves.get(transform.perm[i] as usize) {
            Some(&leaf) => Signal::from_node(leaf) ^ transform.input_negated(i),
            None => Signal::FALSE,
        })
        .collect()
}

/// The cut function, and with don't-cares its two extreme completions.
fn candidate_functions(aig: &Aig, cut: &Cut, params: &CutRewritingParams) -> Vec<TruthTable> {
    let function = cut.function().clone();
    if !params.use_dont_cares {
        return vec![function];
    }
    let care = care_set(aig, cut.leaves(), DONT_CARE_WINDOW);
    if care.is_const1() {
        return vec![function];
    }
    let low = &function & &care;
    let high = &function | &!&care;
    vec![function, low, high]
}

/// Rewrites `aig` in place (as an atomic pass) and reports what happened.
///
/// ```rust
/// use aigsynth::{Aig, rewriting::{CutRewritingParams, cut_rewriting}, simulation::simulate};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let c = aig.create_pi();
/// // (a & b) | (a & c) in 3 gates
/// let ab = aig.create_and(a, b);
/// let ac = aig.create_and(a, c);
/// let f = aig.create_or(ab, ac);
/// aig.create_po(f);
/// let before = simulate(&aig);
/// let stats = cut_rewriting(&mut aig, &CutRewritingParams::default()).unwrap();
/// assert_eq!(aig.num_gates(), 2);
/// assert_eq!(stats.rewrites, 1);
/// assert_eq!(simulate(&aig), before);
/// ```
pub fn cut_rewriting(aig: &mut Aig, params: &CutRewritingParams) -> Result<RewritingStats> {
    let mut work = aig.clone();
    let mut stats = RewritingStats {
        gates_before: work.num_gates(),
        ..RewritingStats::default()
    };

    let mut cut_params = params.cut_enumeration.clone();
    cut_params.cut_size = cut_params.cut_size.min(LIBRARY_INPUTS);
    let mut cuts = LazyCuts::new(cut_params);
    let mut npn = NpnCache::new();
    let mut library = RewritingLibrary::new();
    let mut levels = LevelTracker::new(&work);

    for root in all_gates_topological(&work)? {
        if work.is_dead(root) {
            continue;
        }
        stats.roots += 1;
        let root_cuts: Vec<Cut> = cuts
            .cuts(&work, root)
            .into_iter()
            .filter(|c| c.leaves() != [root])
            .collect();
        let threshold = candidate_threshold(&root_cuts, params);

        let mut best: Option<Candidate> = None;
        for cut in root_cuts.iter().filter(|c| c.size() >= threshold.max(1)) {
            for function in candidate_functions(&work, cut, params) {
                let tt = expand_to_tt16(function.as_u64(), cut.size());
                let (representative, transform) = npn.canonize(tt);
                let structure = library.get(representative)?;
                let inputs = transform_inputs(cut.leaves(), &transform);
                stats.candidates += 1;
                let Some(eval) = evaluate(&work, &levels, structure, &inputs, root, cut.leaves()) else {
                    continue;
                };
                if params.very_verbose {
                    trace!(
                        "root {root}: cut {:?} class {representative:04x} gain {} level {}",
                        cut.leaves(),
                        eval.gain,
                        eval.level
                    );
                }
                let acceptable = eval.gain > 0 || (params.allow_zero_gain && eval.gain == 0);
                if !acceptable || (params.preserve_depth && eval.level > levels.node_level(root)) {
                    continue;
                }
                if best.as_ref().is_none_or(|b| eval.gain > b.gain) {
                    best = Some(Candidate {
                        structure: structure.clone(),
                        inputs,
                        output_neg: transform.output_neg,
                        gain: eval.gain,
                    });
                }
            }
        }

        let Some(candidate) = best else {
            continue;
        };
        if splice(&mut work, &candidate.structure, &candidate.inputs, candidate.output_neg, root)? {
            stats.rewrites += 1;
            stats.estimated_gain += candidate.gain.max(0) as usize;
            if params.preserve_depth {
                levels = LevelTracker::new(&work);
            } else {
                levels.sync(&work);
            }
        }
    }

    work.cleanup_dangling()?;
    stats.gates_after = work.num_gates();
    if params.verbose {
        info!(
            "cut rewriting: {} rewrites, {} -> {} gates",
            stats.rewrites, stats.gates_before, stats.gates_after
        );
    }
    debug!("cut rewriting: {stats:?}");
    *aig = work;
    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{depth::DepthView, simulation::simulate};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn candidate_threshold_test() {
        let mut params = CutRewritingParams::default();
        let small = vec![Cut::trivial(1)];
        assert_eq!(candidate_threshold(&small, &params), 3);
        params.min_cand_cut_size_override = Some(1);
        assert_eq!(candidate_threshold(&small, &params), 1);
    }

    #[test]
    fn transform_inputs_test() {
        let t = NpnTransform {
            perm: [2, 0, 3, 1],
            input_neg_mask: 0b0010,
            output_neg: true,
        };
        let inputs = transform_inputs(&[5, 6, 7], &t);
        assert_eq!(
            inputs,
            vec![Signal::from_node(7), !Signal::from_node(5), Signal::FALSE, Signal::from_node(6)]
        );
    }

    #[test]
    fn factoring_rewrite_test() {
        init();
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let d = aig.create_pi();
        // a&b&c | a&b&d in 4 gates
        let ab = aig.create_and(a, b);
        let abc = aig.create_and(ab, c);
        let abd = aig.create_and(ab, d);
        let f = aig.create_or(abc, abd);
        aig.create_po(f);
        assert_eq!(aig.num_gates(), 4);
        let before = simulate(&aig);
        let stats = cut_rewriting(&mut aig, &CutRewritingParams::default()).unwrap();
        assert_eq!(simulate(&aig), before);
        assert_eq!(aig.num_gates(), 3);
        assert_eq!(stats.gates_before, 4);
        assert_eq!(stats.gates_after, 3);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn small_cuts_are_skipped_test() {
        init();
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        // a&b | !a&b is b, but only 1-leaf cuts show it
        let ab = aig.create_and(a, b);
        let nab = aig.create_and(!a, b);
        let f = aig.create_or(ab, nab);
        aig.create_po(f);
        let mut rewritten = aig.clone();
        cut_rewriting(&mut rewritten, &CutRewritingParams::default()).unwrap();
        assert_eq!(rewritten.num_gates(), 3);

        let params = CutRewritingParams {
            min_cand_cut_size_override: Some(1),
            ..CutRewritingParams::default()
        };
        cut_rewriting(&mut aig, &params).unwrap();
        assert_eq!(aig.num_gates(), 0);
        assert_eq!(aig.po_at(0).unwrap(), b);
    }

    #[test]
    fn preserve_depth_test() {
        init();
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..4).map(|_| aig.create_pi()).collect();
        let ab = aig.create_and(pis[0], pis[1]);
        let cd = aig.create_and(pis[2], pis[3]);
        let f = aig.create_and(ab, cd);
        aig.create_po(f);
        let depth = DepthView::new(&aig).num_levels();
        let before = simulate(&aig);
        let params = CutRewritingParams {
            preserve_depth: true,
            allow_zero_gain: true,
            ..CutRewritingParams::default()
        };
        cut_rewriting(&mut aig, &params).unwrap();
        assert_eq!(simulate(&aig), before);
        assert!(DepthView::new(&aig).num_levels() <= depth);
        assert_eq!(aig.num_gates(), 3);
    }

    #[test]
    fn dont_cares_test() {
        init();
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..6).map(|_| aig.create_pi()).collect();
        let (a, b, c, d, e, z) = (pis[0], pis[1], pis[2], pis[3], pis[4], pis[5]);
        // x implies y, which no cut of 4 leaves can see
        let ab = aig.create_and(a, b);
        let cd = aig.create_and(c, d);
        let cde = aig.create_and(cd, e);
        let x = aig.create_and(ab, cde);
        let ac = aig.create_and(a, c);
        let bd = aig.create_and(b, d);
        let y = aig.create_and(ac, bd);
        let t = aig.create_and(x, !y);
        let f = aig.create_and(t, z);
        aig.create_po(f);
        let before = simulate(&aig);

        let mut plain = aig.clone();
        cut_rewriting(&mut plain, &CutRewritingParams::default()).unwrap();
        assert_eq!(simulate(&plain), before);
        assert!(plain.num_gates() > 0);

        let params = CutRewritingParams {
            use_dont_cares: true,
            ..CutRewritingParams::default()
        };
        cut_rewriting(&mut aig, &params).unwrap();
        assert_eq!(simulate(&aig), before);
        assert_eq!(aig.num_gates(), 0);
    }

    #[test]
    fn verbosity_does_not_change_results_test() {
        init();
        let mut aig = Aig::new();
        let pis: Vec<Signal> = (0..4).map(|_| aig.create_pi()).collect();
        let x = aig.create_xor(pis[0], pis[1]);
        let m = aig.create_maj(x, pis[2], pis[3]);
        let o = aig.create_or(m, pis[0]);
        aig.create_po(o);
        let mut quiet = aig.clone();
        cut_rewriting(&mut quiet, &CutRewritingParams::default()).unwrap();
        let params = CutRewritingParams {
            verbose: true,
            very_verbose: true,
            ..CutRewritingParams::default()
        };
        cut_rewriting(&mut aig, &params).unwrap();
        assert_eq!(aig.to_snapshot(), quiet.to_snapshot());
    }
}
