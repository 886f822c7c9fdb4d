use super::{Aig, AigError, AigNode, NodeId, Result, Signal};

/// Maps nodes of a source AIG to signals of a destination AIG being rebuilt.
pub(crate) type NodeMap = Vec<Option<Signal>>;

impl Aig {
    /// Replays the gate type of `source_node` (a node of `source`) onto `self`, with the
    /// supplied fanins which must be signals of `self`.
    ///
    /// ```rust
    /// use aigsynth::Aig;
    /// let mut src = Aig::new();
    /// let a = src.create_pi();
    /// let b = src.create_pi();
    /// let f = src.create_and(a, b);
    ///
    /// let mut dst = Aig::new();
    /// let x = dst.create_pi();
    /// let y = dst.create_pi();
    /// let g = dst.clone_node(&src, f.node(), &[x, !y]).unwrap();
    /// assert_eq!(dst.fanins(g.node()), &[x, !y]);
    /// assert!(dst.clone_node(&src, f.node(), &[x]).is_err());
    /// ```
    pub fn clone_node(&mut self, source: &Aig, source_node: NodeId, fanins: &[Signal]) -> Result<Signal> {
        let node = source
            .node(source_node)
            .filter(|_| !source.is_dead(source_node))
            .ok_or(AigError::NodeDoesNotExist(source_node))?;
        if !node.is_and() {
            return Err(AigError::NotAGate(source_node));
        }
        let [a, b] = fanins else {
            return Err(AigError::FaninCountMismatch {
                expected: 2,
                found: fanins.len(),
            });
        };
        self.try_create_and(*a, *b)
    }

    /// Creates an AIG holding only the combinational inputs of `self` (same order, same
    /// register metadata, same input names), with the map of those inputs.
    pub(crate) fn rebuild_inputs(&self) -> (Aig, NodeMap) {
        let mut dest = Aig::new();
        let mut map: NodeMap = vec![None; self.size()];
        map[0] = Some(Signal::FALSE);
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                AigNode::Pi(_) => map[id] = Some(dest.create_pi()),
                AigNode::Ro(_) => map[id] = Some(dest.create_ro()),
                _ => (),
            }
        }
        dest.registers = self.registers.clone();
        (dest, map)
    }

    /// Recreates the combinational outputs of `self` in `dest` through `map`, and carries
    /// over the names of every mapped signal.
    pub(crate) fn rebuild_outputs(&self, dest: &mut Aig, map: &NodeMap) -> Result<()> {
        let lookup = |s: Signal| {
            map.get(s.node())
                .copied()
                .flatten()
                .map(|m| m ^ s.is_complemented())
                .ok_or_else(|| {
                    AigError::InvalidState(format!("output driver {} was not rebuilt", s.node()))
                })
        };
        for &po in &self.pos {
            dest.try_create_po(lookup(po)?)?;
        }
        for &ri in &self.ris {
            dest.try_create_ri(lookup(ri)?)?;
        }

        dest.names.network_name = self.names.network_name.clone();
        dest.names.outputs = self.names.outputs.clone();
        for (&signal, name) in &self.names.signals {
            if let Ok(mapped) = lookup(signal) {
                if !mapped.is_constant() {
                    dest.names.signals.entry(mapped).or_insert_with(|| name.clone());
                }
            }
        }
        Ok(())
    }
}
