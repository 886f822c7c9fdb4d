//! Index lists: a flat integer encoding of combinational AIGs.
//!
//! The list is `[num_pis, num_pos, num_gates, (l0, l1) * num_gates, po_literals...]`.
//! Literals are `2 * node + complement`, node 0 is the constant, nodes `1..=num_pis` are
//! the primary inputs and gate `k` is node `num_pis + 1 + k`. A gate record with `l0 < l1`
//! (or `l0 == l1`) is an AND, `l0 > l1` is an XOR.
//!
//! ```rust
//! use aigsynth::{Aig, index_list::{IndexList, to_aig, to_index_list}};
//! let list = IndexList::from_raw(vec![4, 1, 3, 2, 4, 6, 8, 12, 10, 14]).unwrap();
//! let aig = to_aig(&list).unwrap();
//! assert_eq!(aig.num_gates(), 5);
//! assert_eq!(to_index_list(&aig).unwrap().num_gates(), 5);
//! ```

use std::fmt;

use thiserror::Error;

use crate::{Aig, AigError, AigNode, Signal, simulation::evaluation_order};

/// Error returned when an index list is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexListError {
    /// The header `[num_pis, num_pos, num_gates]` is incomplete.
    #[error("index list is truncated: the header needs 3 values")]
    Truncated,

    /// The list length does not match its header.
    #[error("index list should have {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A literal references a node that does not exist yet at this position.
    #[error("literal {literal} at position {position} is out of range")]
    LiteralOutOfRange { position: usize, literal: u32 },

    /// Accessing a value beyond the end of the list.
    #[error("index {0} is out of bounds")]
    IndexOutOfBounds(usize),
}

type Result<T> = std::result::Result<T, IndexListError>;

/// An AND/XOR index list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexList {
    values: Vec<u32>,
}

impl IndexList {
    /// Empty list over `num_pis` primary inputs.
    pub fn new(num_pis: u32) -> Self {
        IndexList {
            values: vec![num_pis, 0, 0],
        }
    }

    /// Validates and wraps raw values.
    pub fn from_raw(values: Vec<u32>) -> Result<Self> {
        let [num_pis, num_pos, num_gates] = match values.get(..3) {
            Some(&[p, o, g]) => [p as usize, o as usize, g as usize],
            _ => return Err(IndexListError::Truncated),
        };
        let expected = 3 + 2 * num_gates + num_pos;
        if values.len() != expected {
            return Err(IndexListError::LengthMismatch {
                expected,
                found: values.len(),
            });
        }
        for k in 0..num_gates {
            let bound = 2 * (num_pis + 1 + k) as u64;
            for position in [3 + 2 * k, 4 + 2 * k] {
                if values[position] as u64 >= bound {
                    return Err(IndexListError::LiteralOutOfRange {
                        position,
                        literal: values[position],
                    });
                }
            }
        }
        let bound = 2 * (num_pis + 1 + num_gates) as u64;
        for position in 3 + 2 * num_gates..expected {
            if values[position] as u64 >= bound {
                return Err(IndexListError::LiteralOutOfRange {
                    position,
                    literal: values[position],
                });
            }
        }
        Ok(IndexList { values })
    }

    pub fn raw(&self) -> &[u32] {
        &self.values
    }

    pub fn into_raw(self) -> Vec<u32> {
        self.values
    }

    pub fn num_pis(&self) -> u32 {
        self.values[0]
    }

    pub fn num_pos(&self) -> u32 {
        self.values[1]
    }

    pub fn num_gates(&self) -> u32 {
        self.values[2]
    }

    /// Number of raw values.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn gates(&self) -> Vec<(u32, u32)> {
        let end = 3 + 2 * self.num_gates() as usize;
        self.values[3..end]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    pub fn pos(&self) -> Vec<u32> {
        let start = 3 + 2 * self.num_gates() as usize;
        self.values[start..].to_vec()
    }

    /// Adds primary inputs. Must happen before any gate is added, as gate literals
    /// depend on the number of inputs.
    pub fn add_inputs(&mut self, count: u32) {
        debug_assert_eq!(self.num_gates(), 0);
        self.values[0] += count;
    }

    fn next_literal(&self) -> u32 {
        2 * (self.num_pis() + 1 + self.num_gates())
    }

    /// Gates go before the output section, so outputs already added keep their place.
    fn push_gate(&mut self, l0: u32, l1: u32) -> u32 {
        let literal = self.next_literal();
        let at = 3 + 2 * self.num_gates() as usize;
        self.values.splice(at..at, [l0, l1]);
        self.values[2] += 1;
        literal
    }

    /// Adds an AND gate and returns its literal.
    pub fn add_and(&mut self, l0: u32, l1: u32) -> u32 {
        self.push_gate(l0.min(l1), l0.max(l1))
    }

    /// Adds an XOR gate and returns its literal.
    ///
    /// `x ^ x` is the constant false and adds nothing, since equal literals encode an AND.
    pub fn add_xor(&mut self, l0: u32, l1: u32) -> u32 {
        if l0 == l1 {
            return 0;
        }
        self.push_gate(l0.max(l1), l0.min(l1))
    }

    pub fn add_output(&mut self, literal: u32) {
        self.values.push(literal);
        self.values[1] += 1;
    }

    /// Removes gates and outputs, keeping the inputs.
    pub fn clear(&mut self) {
        self.values.truncate(3);
        self.values[1] = 0;
        self.values[2] = 0;
    }

    pub fn get(&self, index: usize) -> Result<u32> {
        self.values
            .get(index)
            .copied()
            .ok_or(IndexListError::IndexOutOfBounds(index))
    }

    /// Overwrites a raw value. Header consistency is the caller's business.
    pub fn set(&mut self, index: usize, value: u32) -> Result<()> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(IndexListError::IndexOutOfBounds(index))?;
        *slot = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }

    /// Human readable summary.
    pub fn describe(&self) -> String {
        let gates: Vec<String> = self
            .gates()
            .iter()
            .map(|(a, b)| format!("({a}, {b})"))
            .collect();
        let pos: Vec<String> = self.pos().iter().map(u32::to_string).collect();
        format!(
            "IndexList(#PIs: {}, #POs: {}, #Gates: {}, Gates: [{}], POs: [{}])",
            self.num_pis(),
            self.num_pos(),
            self.num_gates(),
            gates.join(", "),
            pos.join(", ")
        )
    }
}

impl fmt::Display for IndexList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(u32::to_string).collect();
        write!(f, "{{{}}}", values.join(", "))
    }
}

/// Encodes a combinational AIG. Live gates are renumbered (dangling ones included); only
/// AND records are emitted.
pub fn to_index_list(aig: &Aig) -> crate::Result<IndexList> {
    if !aig.is_combinational() {
        return Err(AigError::Sequential(
            "index lists only encode combinational AIGs".to_string(),
        ));
    }
    let mut list = IndexList::new(aig.num_pis() as u32);
    let mut literals: Vec<Option<u32>> = vec![None; aig.size()];
    literals[0] = Some(0);
    for (i, pi) in aig.pis().enumerate() {
        literals[pi] = Some(2 * (i as u32 + 1));
    }
    let literal = |literals: &[Option<u32>], s: Signal| {
        literals[s.node()]
            .map(|l| l ^ s.is_complemented() as u32)
            .ok_or_else(|| AigError::InvalidState(format!("node {} encoded before its fanins", s.node())))
    };
    for gate in evaluation_order(aig) {
        if let Some(AigNode::And([a, b])) = aig.node(gate) {
            let l0 = literal(&literals, *a)?;
            let l1 = literal(&literals, *b)?;
            literals[gate] = Some(list.add_and(l0, l1));
        }
    }
    for po in aig.pos() {
        let l = literal(&literals, po)?;
        list.add_output(l);
    }
    Ok(list)
}

/// Decodes an index list into a fresh AIG, XOR records becoming three AND gates.
pub fn to_aig(list: &IndexList) -> crate::Result<Aig> {
    let mut aig = Aig::new();
    decode_into(&mut aig, list, None)?;
    Ok(aig)
}

/// Decodes `list` inside `aig`, over the given input signals (fresh primary inputs when
/// `inputs` is `None`). Outputs are created as primary outputs only for fresh inputs;
/// the output signals are returned in both cases.
pub(crate) fn decode_into(
    aig: &mut Aig,
    list: &IndexList,
    inputs: Option<&[Signal]>,
) -> crate::Result<Vec<Signal>> {
    let list = IndexList::from_raw(list.values.clone())?;
    let num_pis = list.num_pis() as usize;
    let mut signals = Vec::with_capacity(1 + num_pis + list.num_gates() as usize);
    signals.push(Signal::FALSE);
    match inputs {
        Some(inputs) => {
            if inputs.len() != num_pis {
                return Err(AigError::WrongInputCount {
                    expected: num_pis,
                    found: inputs.len(),
                });
            }
            signals.extend_from_slice(inputs);
        }
        None => signals.extend((0..num_pis).map(|_| aig.create_pi())),
    }
    let signal = |signals: &[Signal], literal: u32| {
        signals[(literal >> 1) as usize] ^ (literal & 1 == 1)
    };
    for (l0, l1) in list.gates() {
        let a = signal(&signals, l0);
        let b = signal(&signals, l1);
        let s = if l0 > l1 {
            aig.create_xor(a, b)
        } else {
            aig.create_and(a, b)
        };
        signals.push(s);
    }
    let outputs: Vec<Signal> = list.pos().iter().map(|&l| signal(&signals, l)).collect();
    if inputs.is_none() {
        for &output in &outputs {
            aig.create_po(output);
        }
    }
    Ok(outputs)
}
