use std::collections::{HashMap, HashSet};

use super::{Aig, AigError, AigNode, NodeId, Result};
use crate::dfs::all_gates_topological;

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment. It checks:
    /// - the constant node is the only node with id 0
    /// - fanins of live gates are ordered and point at live nodes
    /// - structural hashing: one live gate per fanin pair, and every key points to the gate
    /// - the fanout table and reference counts match the fanins and outputs
    /// - acyclicity
    /// - register pairing
    pub fn check_integrity(&self) -> Result<()> {
        if !matches!(self.nodes.first(), Some(AigNode::Constant)) {
            return Err(AigError::InvalidState("node 0 is not the constant".to_string()));
        }

        let mut expected_refs = vec![0u32; self.nodes.len()];
        let mut expected_fanouts: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut pairs = HashSet::new();
        let mut live_gates = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                AigNode::Constant if id != 0 => {
                    return Err(AigError::InvalidState(format!("duplicate constant node {id}")));
                }
                AigNode::Pi(index) if self.pis.get(*index) != Some(&id) => {
                    return Err(AigError::InvalidState(format!(
                        "input {id} is not registered at position {index}"
                    )));
                }
                AigNode::Ro(index) if self.ros.get(*index) != Some(&id) => {
                    return Err(AigError::InvalidState(format!(
                        "register output {id} is not registered at position {index}"
                    )));
                }
                AigNode::And([f0, f1]) if !self.dead[id] => {
                    live_gates += 1;
                    if f0 > f1 {
                        return Err(AigError::InvalidState(format!(
                            "fanins of gate {id} are not ordered"
                        )));
                    }
                    for f in [f0, f1] {
                        if !self.is_live(f.node()) {
                            return Err(AigError::InvalidState(format!(
                                "gate {id} points at node {} which is not in the AIG anymore",
                                f.node()
                            )));
                        }
                        expected_refs[f.node()] += 1;
                        expected_fanouts.entry(f.node()).or_default().push(id);
                    }
                    if Aig::simplify_and(*f0, *f1).is_ok() {
                        return Err(AigError::InvalidState(format!(
                            "gate {id} could have been simplified"
                        )));
                    }
                    if !pairs.insert((*f0, *f1)) {
                        return Err(AigError::InvalidState(format!(
                            "gate {id} duplicates fanins ({f0}, {f1})"
                        )));
                    }
                    if self.strash.get(&(*f0, *f1)) != Some(&id) {
                        return Err(AigError::InvalidState(format!(
                            "gate {id} is missing from the structural hash table"
                        )));
                    }
                }
                _ => (),
            }
        }
        if live_gates != self.num_gates {
            return Err(AigError::InvalidState(format!(
                "{live_gates} live gates but the counter says {}",
                self.num_gates
            )));
        }
        if self.strash.len() != live_gates {
            return Err(AigError::InvalidState(
                "structural hash table holds stale entries".to_string(),
            ));
        }

        // Checking that all outputs are registered as nodes
        for co in self.cos() {
            if !self.is_live(co.node()) {
                return Err(AigError::InvalidState(format!(
                    "output {co} refers to node {} which is not in the aig",
                    co.node()
                )));
            }
            expected_refs[co.node()] += 1;
        }

        for id in self.nodes() {
            if expected_refs[id] != self.refs[id] {
                return Err(AigError::InvalidState(format!(
                    "node {id} has {} references but {} were counted",
                    self.refs[id], expected_refs[id]
                )));
            }
            let mut expected = expected_fanouts.remove(&id).unwrap_or_default();
            let mut actual = self.fanouts[id].clone();
            expected.sort_unstable();
            actual.sort_unstable();
            if expected != actual {
                return Err(AigError::InvalidState(format!(
                    "incoherent fanouts for node {id}: {actual:?} instead of {expected:?}"
                )));
            }
        }

        // Checks for acyclicity
        all_gates_topological(self)?;

        self.check_register_pairing()
    }
}
