//! Evaluation and splicing of replacement structures.
//!
//! A replacement is an index list with one output whose inputs are bound to signals of the
//! AIG. Its cost is evaluated without touching the AIG: gates are looked up in the strash
//! table, the ones that do not exist yet are counted as new.

use std::collections::HashSet;

use crate::{
    Aig, NodeId, Result, Signal,
    dfs::mffc,
    index_list::{IndexList, decode_into, to_index_list},
    resynthesis::LevelTracker,
};

/// Outcome of a dry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Gates freed minus gates created.
    pub gain: isize,
    pub new_nodes: usize,
    /// Level the root would get.
    pub level: u32,
}

#[derive(Debug, Clone, Copy)]
enum DryValue {
    Existing(Signal),
    New,
}

/// Dry run of replacing `root` (whose cone is bounded by `leaves`) by `list` fed with
/// `inputs`. Output polarity does not change the cost.
///
/// Returns `None` when the replacement is the root itself or would use the root.
pub fn evaluate(
    aig: &Aig,
    levels: &LevelTracker,
    list: &IndexList,
    inputs: &[Signal],
    root: NodeId,
    leaves: &[NodeId],
) -> Option<Evaluation> {
    if inputs.len() != list.num_pis() as usize || list.num_pos() != 1 {
        return None;
    }
    let mut values: Vec<(DryValue, u32)> = Vec::with_capacity(1 + inputs.len() + list.num_gates() as usize);
    values.push((DryValue::Existing(Signal::FALSE), 0));
    values.extend(inputs.iter().map(|&s| (DryValue::Existing(s), levels.level(s))));

    let value = |values: &[(DryValue, u32)], literal: u32| {
        let (v, level) = values[(literal >> 1) as usize];
        let v = match v {
            DryValue::Existing(s) => DryValue::Existing(s ^ (literal & 1 == 1)),
            DryValue::New => DryValue::New,
        };
        (v, level)
    };

    let mut reused: Vec<NodeId> = Vec::new();
    let mut new_nodes = 0;
    for (l0, l1) in list.gates() {
        if l0 > l1 {
            return None;
        }
        let (a, level_a) = value(&values, l0);
        let (b, level_b) = value(&values, l1);
        let existing = match (a, b) {
            (DryValue::Existing(a), DryValue::Existing(b)) => aig.has_and(a, b),
            _ => None,
        };
        match existing {
            Some(s) => {
                if s.node() == root {
                    return None;
                }
                reused.push(s.node());
                values.push((DryValue::Existing(s), levels.level(s)));
            }
            None => {
                new_nodes += 1;
                values.push((DryValue::New, 1 + level_a.max(level_b)));
            }
        }
    }
    let output = list.pos()[0];
    let (out, level) = value(&values, output);
    if let DryValue::Existing(s) = out {
        if s.node() == root {
            return None;
        }
        reused.push(s.node());
    }

    let cone: HashSet<NodeId> = mffc(aig, root, leaves).into_iter().collect();
    let mut kept: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = reused.into_iter().filter(|n| cone.contains(n)).collect();
    while let Some(node) = stack.pop() {
        if !kept.insert(node) {
            continue;
        }
        stack.extend(aig.fanins(node).iter().map(|f| f.node()).filter(|n| cone.contains(n)));
    }
    let freed = cone.len() - kept.len();
    Some(Evaluation {
        gain: freed as isize - new_nodes as isize,
        new_nodes,
        level,
    })
}

/// Builds `list` over `inputs` and substitutes `root` with its output.
///
/// Returns false when nothing was substituted because the structure collapsed onto the
/// root itself.
pub fn splice(aig: &mut Aig, list: &IndexList, inputs: &[Signal], output_neg: bool, root: NodeId) -> Result<bool> {
    let outputs = decode_into(aig, list, Some(inputs))?;
    let new = outputs[0] ^ output_neg;
    if new.node() == root {
        return Ok(false);
    }
    aig.substitute_node(root, new)?;
    Ok(true)
}

/// Encodes a structure built by `build` over fresh inputs, one per leaf.
pub fn structure_from(
    num_inputs: usize,
    build: impl FnOnce(&mut Aig, &mut LevelTracker, &[Signal]) -> Signal,
) -> Result<IndexList> {
    let mut scratch = Aig::new();
    let leaves: Vec<Signal> = (0..num_inputs).map(|_| scratch.create_pi()).collect();
    let mut levels = LevelTracker::new(&scratch);
    let out = build(&mut scratch, &mut levels, &leaves);
    scratch.create_po(out);
    scratch.cleanup_dangling()?;
    to_index_list(&scratch)
}
