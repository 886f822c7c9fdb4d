//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`Signal`] and some others relevant structs.
//!
//! An [`Aig`] is an arena: nodes are addressed by their [`NodeId`], fanin signals live in the
//! nodes, and fanouts live in a side table kept in sync by every mutation. Structural hashing
//! guarantees that at most one live AND gate exists per (ordered, simplified) pair of fanins.
//!
//! To optimize an AIG, check [`crate::rewriting`], [`crate::resubstitution`],
//! [`crate::refactoring`] and [`crate::balancing`]. To prove two AIGs equivalent, check
//! [`crate::equivalence`].

mod cleanup;
mod clone;
pub mod error;
mod integrity;
pub mod names;
pub mod node;
pub mod sequential;
pub mod signal;
pub mod snapshot;
mod substitute;

use std::collections::HashMap;

pub use error::{AigError, Result};
pub use names::NameTable;
pub use node::{AigNode, NodeId};
pub use sequential::Register;
pub use signal::Signal;

/// A whole AIG.
///
/// Node 0 is the constant false node. Nodes are appended and never reused, except through
/// structural hashing. The only in-place mutation is substitution (see
/// [`Aig::substitute_node`]), after which nodes that lost all references are marked dead.
/// Dead nodes are skipped by iterators and counts (except [`Aig::size`]) and physically
/// removed by [`Aig::cleanup_dangling`].
///
/// [`Aig::clone`] is a deep copy: the arena, the structural hash table and all side tables
/// are owned, so the clone is fully independent.
///
/// Iterators ([`Aig::nodes`], [`Aig::gates`], ...) borrow the AIG, so the borrow checker
/// rejects mutations while iterating.
#[derive(Debug, Clone)]
pub struct Aig {
    nodes: Vec<AigNode>,
    /// Structural hash table, from ordered fanins to the live gate computing them.
    strash: HashMap<(Signal, Signal), NodeId>,
    /// Gate fanouts of every node (a gate appears once per fanin slot referencing the node).
    fanouts: Vec<Vec<NodeId>>,
    /// Number of references to every node: gate fanins plus combinational outputs.
    refs: Vec<u32>,
    dead: Vec<bool>,
    num_gates: usize,
    pis: Vec<NodeId>,
    ros: Vec<NodeId>,
    pos: Vec<Signal>,
    ris: Vec<Signal>,
    registers: Vec<Register>,
    names: NameTable,
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node [`AigNode::Constant`] included).
    pub fn new() -> Self {
        Aig {
            nodes: vec![AigNode::Constant],
            strash: HashMap::new(),
            fanouts: vec![Vec::new()],
            refs: vec![0],
            dead: vec![false],
            num_gates: 0,
            pis: Vec::new(),
            ros: Vec::new(),
            pos: Vec::new(),
            ris: Vec::new(),
            registers: Vec::new(),
            names: NameTable::default(),
        }
    }

    fn push_node(&mut self, node: AigNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.fanouts.push(Vec::new());
        self.refs.push(0);
        self.dead.push(false);
        id
    }

    /// Appends a new primary input.
    pub fn create_pi(&mut self) -> Signal {
        let id = self.push_node(AigNode::Pi(self.pis.len()));
        self.pis.push(id);
        Signal::from_node(id)
    }

    /// Returns the constant signal of the given value.
    pub fn get_constant(&self, value: bool) -> Signal {
        Signal::FALSE ^ value
    }

    /// Applies the trivial AND simplifications to `a & b`.
    ///
    /// Returns `Ok(signal)` if the result does not need a gate, otherwise the ordered
    /// fanin pair to look up or create.
    pub(crate) fn simplify_and(a: Signal, b: Signal) -> std::result::Result<Signal, (Signal, Signal)> {
        let (a, b) = if a > b { (b, a) } else { (a, b) };
        if a.node() == b.node() {
            // x & x = x, x & !x = 0
            return Ok(if a == b { a } else { Signal::FALSE });
        }
        if a.is_constant() {
            // 1 & x = x, 0 & x = 0
            return Ok(if a.is_complemented() { b } else { Signal::FALSE });
        }
        Err((a, b))
    }

    /// Creates (or retrieves through structural hashing) the AND of two signals.
    ///
    /// Both signals must reference live nodes of this AIG, see [`Aig::try_create_and`] for a
    /// checked version.
    ///
    /// ```rust
    /// use aigsynth::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.create_pi();
    /// let b = aig.create_pi();
    /// let f = aig.create_and(a, b);
    /// let g = aig.create_and(b, a);
    /// assert_eq!(f, g);
    /// assert_eq!(aig.size(), 4);
    /// assert_eq!(aig.create_and(a, !a), aig.get_constant(false));
    /// ```
    pub fn create_and(&mut self, a: Signal, b: Signal) -> Signal {
        debug_assert!(self.is_live(a.node()) && self.is_live(b.node()));
        let (a, b) = match Aig::simplify_and(a, b) {
            Ok(s) => return s,
            Err(key) => key,
        };
        if let Some(&id) = self.strash.get(&(a, b)) {
            return Signal::from_node(id);
        }
        self.add_gate(a, b)
    }

    /// Checked version of [`Aig::create_and`].
    pub fn try_create_and(&mut self, a: Signal, b: Signal) -> Result<Signal> {
        self.check_signal(a)?;
        self.check_signal(b)?;
        Ok(self.create_and(a, b))
    }

    /// Appends a gate without any lookup, fanins must already be ordered.
    fn add_gate(&mut self, a: Signal, b: Signal) -> Signal {
        let id = self.push_node(AigNode::And([a, b]));
        self.strash.insert((a, b), id);
        for fanin in [a, b] {
            self.fanouts[fanin.node()].push(id);
            self.refs[fanin.node()] += 1;
        }
        self.num_gates += 1;
        Signal::from_node(id)
    }

    pub fn create_nand(&mut self, a: Signal, b: Signal) -> Signal {
        !self.create_and(a, b)
    }

    pub fn create_or(&mut self, a: Signal, b: Signal) -> Signal {
        !self.create_and(!a, !b)
    }

    pub fn create_nor(&mut self, a: Signal, b: Signal) -> Signal {
        self.create_and(!a, !b)
    }

    /// XOR with three AND gates.
    pub fn create_xor(&mut self, a: Signal, b: Signal) -> Signal {
        let complement = a.is_complemented() ^ b.is_complemented();
        let c1 = self.create_and(a.positive(), !b.positive());
        let c2 = self.create_and(b.positive(), !a.positive());
        self.create_and(!c1, !c2) ^ !complement
    }

    pub fn create_xnor(&mut self, a: Signal, b: Signal) -> Signal {
        !self.create_xor(a, b)
    }

    /// Majority of three.
    pub fn create_maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        let ab = self.create_and(a, b);
        let a_or_b = self.create_or(a, b);
        let c_and = self.create_and(c, a_or_b);
        self.create_or(ab, c_and)
    }

    /// If-then-else: `cond ? then : otherwise`.
    pub fn create_ite(&mut self, cond: Signal, then: Signal, otherwise: Signal) -> Signal {
        let t = self.create_and(cond, then);
        let e = self.create_and(!cond, otherwise);
        self.create_or(t, e)
    }

    pub fn create_buf(&mut self, a: Signal) -> Signal {
        a
    }

    pub fn create_not(&mut self, a: Signal) -> Signal {
        !a
    }

    fn create_tree(
        &mut self,
        signals: &[Signal],
        neutral: Signal,
        op: fn(&mut Aig, Signal, Signal) -> Signal,
    ) -> Signal {
        if signals.is_empty() {
            return neutral;
        }
        let mut level = signals.to_vec();
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                match pair {
                    [a, b] => next.push(op(self, *a, *b)),
                    [a] => next.push(*a),
                    _ => unreachable!(),
                }
            }
            level = next;
        }
        level[0]
    }

    /// Balanced AND of all the signals (true if empty).
    pub fn create_nary_and(&mut self, signals: &[Signal]) -> Signal {
        self.create_tree(signals, Signal::TRUE, Aig::create_and)
    }

    /// Balanced OR of all the signals (false if empty).
    pub fn create_nary_or(&mut self, signals: &[Signal]) -> Signal {
        self.create_tree(signals, Signal::FALSE, Aig::create_or)
    }

    /// Balanced XOR of all the signals (false if empty).
    pub fn create_nary_xor(&mut self, signals: &[Signal]) -> Signal {
        self.create_tree(signals, Signal::FALSE, Aig::create_xor)
    }

    /// Appends a primary output and returns its index.
    ///
    /// # Panics
    ///
    /// If `signal` does not reference a live node, see [`Aig::try_create_po`].
    pub fn create_po(&mut self, signal: Signal) -> usize {
        assert!(
            self.is_live(signal.node()),
            "primary output driven by missing node {}",
            signal.node()
        );
        self.refs[signal.node()] += 1;
        self.pos.push(signal);
        self.pos.len() - 1
    }

    /// Checked version of [`Aig::create_po`].
    pub fn try_create_po(&mut self, signal: Signal) -> Result<usize> {
        self.check_signal(signal)?;
        Ok(self.create_po(signal))
    }

    /// Looks up the AND of two signals without creating anything.
    ///
    /// Trivial cases (constants, equal or opposite signals) are answered without any gate.
    pub fn has_and(&self, a: Signal, b: Signal) -> Option<Signal> {
        match Aig::simplify_and(a, b) {
            Ok(s) => Some(s),
            Err(key) => self.strash.get(&key).map(|&id| Signal::from_node(id)),
        }
    }

    /// Number of nodes in the arena, constant and dead nodes included.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_pis(&self) -> usize {
        self.pis.len()
    }

    pub fn num_pos(&self) -> usize {
        self.pos.len()
    }

    /// Number of combinational inputs (primary inputs and register outputs).
    pub fn num_cis(&self) -> usize {
        self.pis.len() + self.ros.len()
    }

    /// Number of combinational outputs (primary outputs and register inputs).
    pub fn num_cos(&self) -> usize {
        self.pos.len() + self.ris.len()
    }

    /// Number of live AND gates.
    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    /// Retrieves a node from its id.
    pub fn node(&self, id: NodeId) -> Option<&AigNode> {
        self.nodes.get(id)
    }

    pub fn is_constant(&self, id: NodeId) -> bool {
        id == 0
    }

    pub fn is_pi(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(AigNode::is_pi)
    }

    pub fn is_ci(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(AigNode::is_ci)
    }

    pub fn is_and(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(AigNode::is_and)
    }

    /// True if the node was taken out by a substitution.
    pub fn is_dead(&self, id: NodeId) -> bool {
        self.dead.get(id).copied().unwrap_or(false)
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        id < self.nodes.len() && !self.dead[id]
    }

    pub(crate) fn check_node(&self, id: NodeId) -> Result<()> {
        if self.is_live(id) {
            Ok(())
        } else {
            Err(AigError::NodeDoesNotExist(id))
        }
    }

    pub(crate) fn check_signal(&self, signal: Signal) -> Result<()> {
        self.check_node(signal.node())
    }

    pub fn fanin_size(&self, id: NodeId) -> usize {
        self.fanins(id).len()
    }

    /// Number of references to the node: gate fanins, primary outputs and register inputs.
    pub fn fanout_size(&self, id: NodeId) -> usize {
        self.refs.get(id).copied().unwrap_or(0) as usize
    }

    /// Fanin signals of the node, empty for the constant and inputs.
    pub fn fanins(&self, id: NodeId) -> &[Signal] {
        self.nodes.get(id).map(AigNode::fanins).unwrap_or(&[])
    }

    /// Gate fanouts of the node; outputs are not listed (see [`Aig::fanout_size`]).
    pub fn fanouts(&self, id: NodeId) -> &[NodeId] {
        self.fanouts.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of the node among primary inputs.
    pub fn pi_index(&self, id: NodeId) -> Option<usize> {
        match self.nodes.get(id) {
            Some(AigNode::Pi(index)) => Some(*index),
            _ => None,
        }
    }

    /// Position of the node among combinational inputs (primary inputs first).
    pub fn ci_index(&self, id: NodeId) -> Option<usize> {
        match self.nodes.get(id) {
            Some(AigNode::Pi(index)) => Some(*index),
            Some(AigNode::Ro(index)) => Some(self.pis.len() + index),
            _ => None,
        }
    }

    pub fn pi_at(&self, index: usize) -> Result<Signal> {
        self.pis
            .get(index)
            .map(|&id| Signal::from_node(id))
            .ok_or(AigError::PiIndexOutOfRange(index))
    }

    pub fn po_at(&self, index: usize) -> Result<Signal> {
        self.pos
            .get(index)
            .copied()
            .ok_or(AigError::PoIndexOutOfRange(index))
    }

    /// Combinational input at `index` (primary inputs first, then register outputs).
    pub fn ci_at(&self, index: usize) -> Option<NodeId> {
        self.pis
            .get(index)
            .or_else(|| self.ros.get(index.checked_sub(self.pis.len())?))
            .copied()
    }

    /// Combinational output at `index` (primary outputs first, then register inputs).
    pub fn co_at(&self, index: usize) -> Option<Signal> {
        self.pos
            .get(index)
            .or_else(|| self.ris.get(index.checked_sub(self.pos.len())?))
            .copied()
    }

    pub fn node_to_index(&self, id: NodeId) -> usize {
        id
    }

    pub fn index_to_node(&self, index: usize) -> NodeId {
        index
    }

    /// Live nodes in creation order, constant included.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(|&id| !self.dead[id])
    }

    /// Live AND gates in creation order.
    pub fn gates(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(|&id| !self.dead[id] && self.nodes[id].is_and())
    }

    /// Primary inputs in creation order.
    pub fn pis(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pis.iter().copied()
    }

    /// Combinational inputs: primary inputs, then register outputs.
    pub fn cis(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pis.iter().chain(self.ros.iter()).copied()
    }

    /// Primary outputs in creation order.
    pub fn pos(&self) -> impl Iterator<Item = Signal> + '_ {
        self.pos.iter().copied()
    }

    /// Combinational outputs: primary outputs, then register inputs.
    pub fn cos(&self) -> impl Iterator<Item = Signal> + '_ {
        self.pos.iter().chain(self.ris.iter()).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constants_test() {
        let aig = Aig::new();
        assert_eq!(aig.size(), 1);
        assert_eq!(aig.num_gates(), 0);
        assert_eq!(aig.nodes().collect::<Vec<_>>(), vec![0]);
        assert_eq!(aig.gates().count(), 0);

        let c0 = aig.get_constant(false);
        let c1 = aig.get_constant(true);
        assert!(aig.is_constant(c0.node()));
        assert!(!aig.is_pi(c0.node()));
        assert_eq!(c0.node(), c1.node());
        assert!(c1.is_complemented());
        assert_eq!(c0, !c1);
    }

    #[test]
    fn primary_inputs_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        assert_eq!(aig.size(), 3);
        assert_eq!(aig.num_pis(), 2);
        assert_eq!(aig.pi_index(a.node()), Some(0));
        assert_eq!(aig.pi_index(b.node()), Some(1));
        assert_eq!(a.literal(), 2);
        assert_eq!((!a).literal(), 3);
        assert!(aig.pi_at(2).is_err());
    }

    #[test]
    fn primary_outputs_test() {
        let mut aig = Aig::new();
        let c0 = aig.get_constant(false);
        let x1 = aig.create_pi();
        assert_eq!(aig.create_po(c0), 0);
        assert_eq!(aig.create_po(x1), 1);
        assert_eq!(aig.create_po(!x1), 2);
        assert_eq!(aig.size(), 2);
        assert_eq!(aig.pos().collect::<Vec<_>>(), vec![c0, x1, !x1]);
        assert_eq!(aig.po_at(2).unwrap(), !x1);
        assert!(matches!(aig.po_at(3), Err(AigError::PoIndexOutOfRange(3))));
    }

    #[test]
    fn checked_outputs_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let missing = Signal::from_literal(200);
        assert!(matches!(aig.try_create_po(missing), Err(AigError::NodeDoesNotExist(100))));
        assert!(matches!(aig.try_create_ri(!missing), Err(AigError::NodeDoesNotExist(100))));
        assert_eq!(aig.num_cos(), 0);

        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, c);
        assert_eq!(aig.try_create_po(f).unwrap(), 0);
        aig.substitute_node(ab.node(), a).unwrap();
        assert!(matches!(
            aig.try_create_po(!ab),
            Err(AigError::NodeDoesNotExist(n)) if n == ab.node()
        ));
        assert_eq!(aig.try_create_po(!a).unwrap(), 1);
        assert_eq!(aig.fanout_size(a.node()), 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    #[should_panic(expected = "missing node 100")]
    fn unchecked_output_panics_test() {
        let mut aig = Aig::new();
        aig.create_pi();
        aig.create_po(Signal::from_literal(200));
    }

    #[test]
    fn unary_operations_test() {
        let mut aig = Aig::new();
        let x1 = aig.create_pi();
        assert_eq!(aig.create_buf(x1), x1);
        assert_eq!(aig.create_not(x1), !x1);
        assert_eq!(aig.size(), 2);
    }

    #[test]
    fn binary_operations_test() {
        let mut aig = Aig::new();
        let x1 = aig.create_pi();
        let x2 = aig.create_pi();
        assert_eq!(aig.size(), 3);

        let f1 = aig.create_and(x1, x2);
        assert_eq!(aig.size(), 4);
        let f2 = aig.create_nand(x1, x2);
        assert_eq!(aig.size(), 4);
        assert_eq!(f1, !f2);

        let f3 = aig.create_or(x1, x2);
        assert_eq!(aig.size(), 5);
        let f4 = aig.create_nor(x1, x2);
        assert_eq!(aig.size(), 5);
        assert_eq!(f3, !f4);

        let f5 = aig.create_xor(x1, x2);
        assert_eq!(aig.size(), 8);
        let f6 = aig.create_xnor(x1, x2);
        assert_eq!(aig.size(), 8);
        assert_eq!(f5, !f6);
    }

    #[test]
    fn hash_nodes_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f = aig.create_and(a, b);
        let g = aig.create_and(a, b);
        assert_eq!(aig.size(), 4);
        assert_eq!(aig.num_gates(), 1);
        assert_eq!(f.node(), g.node());
    }

    #[test]
    fn simplifications_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        assert_eq!(aig.create_and(a, Signal::FALSE), Signal::FALSE);
        assert_eq!(aig.create_and(a, Signal::TRUE), a);
        assert_eq!(aig.create_and(Signal::TRUE, !a), !a);
        assert_eq!(aig.create_and(a, a), a);
        assert_eq!(aig.create_and(a, !a), Signal::FALSE);
        assert_eq!(aig.num_gates(), 0);
    }

    #[test]
    fn try_create_and_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        assert!(matches!(
            aig.try_create_and(a, Signal::from_node(7)),
            Err(AigError::NodeDoesNotExist(7))
        ));
        assert!(aig.try_create_and(a, Signal::TRUE).is_ok());
    }

    #[test]
    fn structural_properties_test() {
        let mut aig = Aig::new();
        let x1 = aig.create_pi();
        let x2 = aig.create_pi();
        let f1 = aig.create_and(x1, x2);
        let f2 = aig.create_or(x1, x2);
        aig.create_po(f1);
        aig.create_po(f2);

        assert_eq!(aig.size(), 5);
        assert_eq!(aig.num_pis(), 2);
        assert_eq!(aig.num_pos(), 2);
        assert_eq!(aig.num_gates(), 2);
        assert_eq!(aig.fanin_size(x1.node()), 0);
        assert_eq!(aig.fanin_size(f1.node()), 2);
        assert_eq!(aig.fanout_size(x1.node()), 2);
        assert_eq!(aig.fanout_size(x2.node()), 2);
        assert_eq!(aig.fanout_size(f1.node()), 1);
        assert_eq!(aig.fanout_size(f2.node()), 1);
        assert!(aig.fanouts(f2.node()).is_empty());
    }

    #[test]
    fn has_and_test() {
        let mut aig = Aig::new();
        let x1 = aig.create_pi();
        let x2 = aig.create_pi();
        let x3 = aig.create_pi();
        let n4 = aig.create_and(!x1, x2);
        let n5 = aig.create_and(x1, n4);
        let n6 = aig.create_and(x3, n5);
        let n7 = aig.create_and(n4, x2);
        let n8 = aig.create_and(!n5, !n7);
        let n9 = aig.create_and(!n8, n4);
        aig.create_po(n6);
        aig.create_po(n9);

        assert_eq!(aig.has_and(!x1, x2), Some(n4));
        assert_eq!(aig.has_and(!x1, x3), None);
        assert_eq!(aig.has_and(!n7, !n5), Some(n8));
        assert_eq!(aig.size(), 10);
    }

    #[test]
    fn iteration_test() {
        let mut aig = Aig::new();
        let x1 = aig.create_pi();
        let x2 = aig.create_pi();
        let f1 = aig.create_and(x1, x2);
        let f2 = aig.create_or(x1, x2);
        aig.create_po(f1);
        aig.create_po(f2);

        let mask: usize = aig.nodes().map(|n| 1 << aig.node_to_index(n)).sum();
        assert_eq!(mask, 31);
        // iterators are restartable
        assert_eq!(aig.nodes().count(), 5);
        assert_eq!(aig.nodes().count(), 5);
        let mask: usize = aig.pis().map(|n| 1 << n).sum();
        assert_eq!(mask, 6);
        let mask: usize = aig.pos().map(|s| 1 << s.node()).sum();
        assert_eq!(mask, 24);
        let mask: usize = aig.gates().map(|n| 1 << n).sum();
        assert_eq!(mask, 24);
        let mask: usize = aig.fanins(f1.node()).iter().map(|s| 1 << s.node()).sum();
        assert_eq!(mask, 6);
        assert_eq!(aig.gates().next(), Some(3));
    }

    #[test]
    fn nary_test() {
        let mut aig = Aig::new();
        let xs: Vec<Signal> = (0..5).map(|_| aig.create_pi()).collect();
        aig.create_nary_and(&xs);
        assert_eq!(aig.num_gates(), 4);
        assert_eq!(aig.create_nary_or(&[]), Signal::FALSE);
        assert_eq!(aig.create_nary_and(&[]), Signal::TRUE);
        assert_eq!(aig.create_nary_xor(&xs[..1]), xs[0]);
    }
}
