//! In-place substitution of nodes, keeping the structural hash table, the fanout table and
//! reference counts in sync.

use std::collections::HashSet;

use log::trace;

use super::{Aig, AigError, AigNode, NodeId, Result, Signal};

impl Aig {
    /// Redirects every reference to `old` (gate fanins, primary outputs and register inputs)
    /// to `new`, which must not depend on `old`.
    ///
    /// Each touched fanout is re-hashed. A fanout that simplifies to a signal, or whose new
    /// fanins collide with an existing gate, is itself substituted. Gates left without
    /// references are taken out recursively. Substituting a node by its own complement is
    /// allowed and flips the polarity of every reference.
    pub fn substitute_node(&mut self, old: NodeId, new: Signal) -> Result<()> {
        self.substitute(old, new, true)
    }

    /// Like [`Aig::substitute_node`] but fanouts are neither simplified nor merged with
    /// existing gates. Structural hash keys are still updated where they are vacant.
    pub fn substitute_node_no_restrash(&mut self, old: NodeId, new: Signal) -> Result<()> {
        self.substitute(old, new, false)
    }

    fn substitute(&mut self, old: NodeId, new: Signal, restrash: bool) -> Result<()> {
        self.check_node(old)?;
        self.check_signal(new)?;
        if old == 0 {
            return Err(AigError::InvalidState(
                "the constant node cannot be substituted".to_string(),
            ));
        }
        if new == Signal::from_node(old) {
            return Ok(());
        }
        if new.node() != old && self.in_transitive_fanin(old, new.node()) {
            return Err(AigError::CyclicSubstitution(old, new));
        }

        let mut worklist = vec![(old, new)];
        // queued replacements are pinned so that they are not taken out meanwhile
        self.refs[new.node()] += 1;
        while let Some((old, new)) = worklist.pop() {
            if !self.dead[old] {
                trace!("substituting node {old} with {new}");
                self.redirect(old, new, restrash, &mut worklist);
            }
            self.refs[new.node()] -= 1;
            if self.refs[old] == 0 && self.nodes[old].is_and() {
                self.take_out_unreferenced(old);
            }
        }
        Ok(())
    }

    /// True if `node` is `root` or lies in its transitive fanin.
    fn in_transitive_fanin(&self, node: NodeId, root: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if n == node {
                return true;
            }
            if visited.insert(n) {
                stack.extend(self.nodes[n].fanins().iter().map(|f| f.node()));
            }
        }
        false
    }

    fn redirect(
        &mut self,
        old: NodeId,
        new: Signal,
        restrash: bool,
        worklist: &mut Vec<(NodeId, Signal)>,
    ) {
        for co in self.pos.iter_mut().chain(self.ris.iter_mut()) {
            if co.node() == old {
                *co = new ^ co.is_complemented();
                self.refs[old] -= 1;
                self.refs[new.node()] += 1;
            }
        }

        let parents = std::mem::take(&mut self.fanouts[old]);
        let mut seen = HashSet::with_capacity(parents.len());
        for parent in parents {
            if !seen.insert(parent) || self.dead[parent] {
                continue;
            }
            let AigNode::And([f0, f1]) = self.nodes[parent] else {
                continue;
            };
            if self.strash.get(&(f0, f1)) == Some(&parent) {
                self.strash.remove(&(f0, f1));
            }

            let replace = |f: Signal| {
                if f.node() == old {
                    new ^ f.is_complemented()
                } else {
                    f
                }
            };
            for f in [f0, f1] {
                if f.node() == old {
                    self.refs[old] -= 1;
                    self.refs[new.node()] += 1;
                    self.fanouts[new.node()].push(parent);
                }
            }
            let (n0, n1) = (replace(f0), replace(f1));
            let key = if n0 > n1 { (n1, n0) } else { (n0, n1) };
            self.nodes[parent] = AigNode::And([key.0, key.1]);

            if !restrash {
                self.strash.entry(key).or_insert(parent);
                continue;
            }
            let replacement = match Aig::simplify_and(key.0, key.1) {
                Ok(signal) => Some(signal),
                Err(key) => match self.strash.get(&key) {
                    Some(&other) if other != parent => Some(Signal::from_node(other)),
                    Some(_) => None,
                    None => {
                        self.strash.insert(key, parent);
                        None
                    }
                },
            };
            if let Some(signal) = replacement {
                self.refs[signal.node()] += 1;
                worklist.push((parent, signal));
            }
        }
    }

    /// Marks an unreferenced gate as dead and releases its fanins, recursively.
    ///
    /// Fails if the node is not a live gate, or if it is still referenced.
    pub fn take_out_node(&mut self, id: NodeId) -> Result<()> {
        self.check_node(id)?;
        if !self.nodes[id].is_and() {
            return Err(AigError::NotAGate(id));
        }
        if self.refs[id] != 0 {
            return Err(AigError::InvalidState(format!(
                "node {id} is still referenced {} times",
                self.refs[id]
            )));
        }
        self.take_out_unreferenced(id);
        Ok(())
    }

    pub(crate) fn take_out_unreferenced(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.dead[node] {
                continue;
            }
            let AigNode::And([f0, f1]) = self.nodes[node] else {
                continue;
            };
            self.dead[node] = true;
            self.num_gates -= 1;
            if self.strash.get(&(f0, f1)) == Some(&node) {
                self.strash.remove(&(f0, f1));
            }
            for f in [f0, f1] {
                let fanin = f.node();
                self.refs[fanin] -= 1;
                if let Some(pos) = self.fanouts[fanin].iter().position(|&n| n == node) {
                    self.fanouts[fanin].swap_remove(pos);
                }
                if self.refs[fanin] == 0 && self.nodes[fanin].is_and() && !self.dead[fanin] {
                    stack.push(fanin);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn substitute_reduces_gates_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, c);
        aig.create_po(f);
        assert_eq!(aig.num_gates(), 2);

        aig.substitute_node(ab.node(), a).unwrap();
        assert_eq!(aig.num_gates(), 1);
        assert!(aig.is_dead(ab.node()));
        assert_eq!(aig.fanins(f.node()), &[a, c]);
        assert_eq!(aig.fanout_size(b.node()), 0);
        assert_eq!(aig.has_and(a, c), Some(f));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn substitute_rejects_cycles_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, c);
        let g = aig.create_and(f, !a);
        aig.create_po(g);

        assert!(matches!(
            aig.substitute_node(ab.node(), !g),
            Err(AigError::CyclicSubstitution(n, s)) if n == ab.node() && s == !g
        ));
        assert!(matches!(
            aig.substitute_node_no_restrash(ab.node(), f),
            Err(AigError::CyclicSubstitution(..))
        ));
        assert_eq!(aig.num_gates(), 3);
        assert_eq!(aig.fanins(f.node()), &[c, ab]);
        aig.check_integrity().unwrap();

        aig.substitute_node(g.node(), !g).unwrap();
        assert_eq!(aig.po_at(0).unwrap(), !g);
        aig.substitute_node(ab.node(), b).unwrap();
        assert_eq!(aig.num_gates(), 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn substitute_merges_collisions_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let ac = aig.create_and(a, c);
        let f = aig.create_and(ab, c);
        let g = aig.create_and(ac, c);
        aig.create_po(f);
        aig.create_po(g);

        // f becomes a & c, which already exists as `ac`
        aig.substitute_node(ab.node(), a).unwrap();
        assert_eq!(aig.po_at(0).unwrap(), ac);
        assert!(aig.is_dead(f.node()));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn substitute_simplification_cascade_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(!a, ab);
        aig.create_po(!f);

        // f becomes !a & a = 0, so the output becomes constant true
        aig.substitute_node(ab.node(), a).unwrap();
        assert_eq!(aig.po_at(0).unwrap(), Signal::TRUE);
        assert_eq!(aig.num_gates(), 0);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn substitute_complement_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, c);
        aig.create_po(ab);
        aig.create_po(f);

        aig.substitute_node(ab.node(), !ab).unwrap();
        assert_eq!(aig.po_at(0).unwrap(), !ab);
        assert_eq!(aig.fanins(f.node()), &[c, !ab]);
        assert_eq!(aig.num_gates(), 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn substitute_no_restrash_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, !a);
        aig.create_po(f);

        aig.substitute_node_no_restrash(ab.node(), a).unwrap();
        // no simplification happened
        assert!(!aig.is_dead(f.node()));
        assert_eq!(aig.fanins(f.node()), &[a, !a]);
        assert!(aig.is_dead(ab.node()));
    }

    #[test]
    fn take_out_node_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let ab = aig.create_and(a, b);
        let f = aig.create_and(ab, a);
        aig.create_po(ab);
        assert!(aig.take_out_node(ab.node()).is_err());
        assert!(matches!(aig.take_out_node(a.node()), Err(AigError::NotAGate(_))));
        aig.take_out_node(f.node()).unwrap();
        assert!(aig.is_dead(f.node()));
        assert_eq!(aig.num_gates(), 1);
        assert_eq!(aig.fanout_size(ab.node()), 1);
        assert!(aig.take_out_node(f.node()).is_err());
    }
}
