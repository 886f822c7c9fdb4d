//! Serializable snapshots of an [`Aig`].
//!
//! A snapshot stores the network as an index list whose inputs are the combinational
//! inputs (primary inputs then register outputs) and whose outputs are the combinational
//! outputs (primary outputs then register inputs), along with register metadata and names.
//! Taking a snapshot therefore renumbers nodes like [`Aig::cleanup_dangling`] would,
//! except that dangling gates are kept.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Aig, AigError, AigNode, NameTable, Register, Result, Signal};
use crate::{index_list::IndexList, simulation::evaluation_order};

/// Plain data view of an AIG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AigSnapshot {
    /// Raw index list, see [`crate::index_list`].
    pub index_list: Vec<u32>,
    pub num_registers: usize,
    pub registers: Vec<Register>,
    pub names: NameTable,
}

impl Aig {
    pub fn to_snapshot(&self) -> AigSnapshot {
        let mut list = IndexList::new(self.num_cis() as u32);
        let mut literals: Vec<Option<u32>> = vec![None; self.size()];
        literals[0] = Some(0);
        for (i, ci) in self.cis().enumerate() {
            literals[ci] = Some(2 * (i as u32 + 1));
        }
        let literal = |literals: &[Option<u32>], s: Signal| {
            literals[s.node()].map(|l| l ^ s.is_complemented() as u32)
        };
        for gate in evaluation_order(self) {
            if let AigNode::And([a, b]) = self.nodes[gate] {
                if let (Some(l0), Some(l1)) = (literal(&literals, a), literal(&literals, b)) {
                    literals[gate] = Some(list.add_and(l0, l1));
                }
            }
        }
        for co in self.cos() {
            list.add_output(literal(&literals, co).unwrap_or(0));
        }

        let signal_of = |literal: u32| Signal::from_literal(literal as usize);
        let signals: HashMap<Signal, String> = self
            .names
            .signals
            .iter()
            .filter_map(|(s, name)| literal(&literals, *s).map(|l| (signal_of(l), name.clone())))
            .collect();
        AigSnapshot {
            index_list: list.into_raw(),
            num_registers: self.num_registers(),
            registers: self.registers.clone(),
            names: NameTable {
                network_name: self.names.network_name.clone(),
                signals,
                outputs: self.names.outputs.clone(),
            },
        }
    }

    /// Rebuilds an AIG from a snapshot. Nothing is returned unless the snapshot is fully
    /// consistent.
    pub fn from_snapshot(snapshot: &AigSnapshot) -> Result<Aig> {
        let list = IndexList::from_raw(snapshot.index_list.clone())?;
        let num_cis = list.num_pis() as usize;
        let num_cos = list.num_pos() as usize;
        let num_registers = snapshot.num_registers;
        if num_registers > num_cis || num_registers > num_cos {
            return Err(AigError::Snapshot(format!(
                "{num_registers} registers for {num_cis} inputs and {num_cos} outputs"
            )));
        }
        if snapshot.registers.len() != num_registers {
            return Err(AigError::Snapshot(format!(
                "{} register descriptions for {num_registers} registers",
                snapshot.registers.len()
            )));
        }
        if let Some(init) = snapshot.registers.iter().map(|r| r.init).find(|i| ![0, 1, 3].contains(i)) {
            return Err(AigError::Snapshot(format!("invalid register init value {init}")));
        }
        if list.gates().iter().any(|(l0, l1)| l0 > l1) {
            return Err(AigError::Snapshot("snapshots only hold AND gates".to_string()));
        }

        let mut aig = Aig::new();
        let mut signals = vec![Signal::FALSE];
        for _ in 0..num_cis - num_registers {
            signals.push(aig.create_pi());
        }
        for _ in 0..num_registers {
            signals.push(aig.create_ro());
        }
        let signal = |signals: &[Signal], literal: u32| {
            signals[(literal >> 1) as usize] ^ (literal & 1 == 1)
        };
        for (l0, l1) in list.gates() {
            let s = aig.create_and(signal(&signals, l0), signal(&signals, l1));
            signals.push(s);
        }
        let outputs = list.pos();
        let (pos, ris) = outputs.split_at(num_cos - num_registers);
        for &l in pos {
            aig.create_po(signal(&signals, l));
        }
        for &l in ris {
            aig.create_ri(signal(&signals, l));
        }
        aig.registers = snapshot.registers.clone();

        let bound = 2 * signals.len();
        aig.names.network_name = snapshot.names.network_name.clone();
        for (s, name) in &snapshot.names.signals {
            if s.literal() >= bound {
                return Err(AigError::Snapshot(format!("name '{name}' given to unknown signal {s}")));
            }
            aig.names
                .signals
                .insert(signal(&signals, s.literal() as u32), name.clone());
        }
        for (&index, name) in &snapshot.names.outputs {
            if index >= num_cos {
                return Err(AigError::Snapshot(format!("name '{name}' given to unknown output {index}")));
            }
            aig.names.outputs.insert(index, name.clone());
        }
        Ok(aig)
    }

    /// JSON form of [`Aig::to_snapshot`].
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_snapshot()).map_err(|e| AigError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Aig> {
        let snapshot: AigSnapshot =
            serde_json::from_str(json).map_err(|e| AigError::Snapshot(e.to_string()))?;
        Aig::from_snapshot(&snapshot)
    }
}
