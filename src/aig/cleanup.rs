use log::debug;

use super::{Aig, Result, Signal};
use crate::dfs::topological_order;

impl Aig {
    /// Removes every gate that is not in the fanin of a combinational output, as well as
    /// nodes taken out by substitutions.
    ///
    /// The constant and all combinational inputs are kept, in the same order. Remaining
    /// gates are relabelled contiguously in topological order, so ids change. Names and
    /// registers are preserved.
    ///
    /// ```rust
    /// use aigsynth::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.create_pi();
    /// let b = aig.create_pi();
    /// let f = aig.create_and(a, b);
    /// aig.create_and(!a, b);
    /// aig.create_po(f);
    /// aig.cleanup_dangling().unwrap();
    /// assert_eq!(aig.size(), 4);
    /// ```
    pub fn cleanup_dangling(&mut self) -> Result<()> {
        let order = topological_order(self)?;
        let (mut dest, mut map) = self.rebuild_inputs();
        for id in order {
            let [f0, f1] = self.nodes[id].fanins() else {
                continue;
            };
            let lookup = |f: &Signal| map[f.node()].map(|m| m ^ f.is_complemented());
            if let (Some(a), Some(b)) = (lookup(f0), lookup(f1)) {
                map[id] = Some(dest.create_and(a, b));
            }
        }
        self.rebuild_outputs(&mut dest, &map)?;
        debug!("cleanup: {} nodes -> {} nodes", self.size(), dest.size());
        *self = dest;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::simulation::simulate;

    #[test]
    fn cleanup_dangling_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f1 = aig.create_and(a, b);
        let f2 = aig.create_or(a, b);
        aig.create_and(f1, f2);
        aig.create_and(!f1, f2);
        aig.create_nand(a, !b);
        aig.create_po(f1);
        aig.create_po(!f2);
        assert_eq!(aig.size(), 8);

        aig.cleanup_dangling().unwrap();
        assert_eq!(aig.size(), 5);
        assert_eq!(aig.num_gates(), 2);

        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let f1 = aig.create_and(a, b);
        let f2 = aig.create_or(a, b);
        let f3 = aig.create_and(f1, !f2);
        aig.create_and(!f1, f2);
        aig.create_and(a, !b);
        aig.create_po(f3);
        let before = simulate(&aig);
        aig.cleanup_dangling().unwrap();
        assert_eq!(aig.size(), 6);
        assert_eq!(simulate(&aig), before);
    }

    #[test]
    fn cleanup_after_substitution_test() {
        let mut aig = Aig::new();
        let a = aig.create_pi();
        let b = aig.create_pi();
        let c = aig.create_pi();
        let bc = aig.create_and(b, c);
        let f = aig.create_and(a, bc);
        aig.create_po(f);
        let ab = aig.create_and(a, b);
        let g = aig.create_and(ab, c);
        // g was created after f, cleanup must still relabel in topological order
        aig.substitute_node(f.node(), g).unwrap();
        aig.cleanup_dangling().unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(aig.num_gates(), 2);
        assert_eq!(aig.size(), 6);
        assert_eq!(aig.fanins(5), &[Signal::from_node(3), Signal::from_node(4)]);
    }

    #[test]
    fn named_aig_survives_cleanup_test() {
        let mut aig = Aig::new();
        aig.set_network_name("top");
        let a = aig.create_named_pi("a");
        let b = aig.create_named_pi("b");
        let r = aig.create_ro();
        aig.set_name(r, "state");
        aig.create_and(a, !b);
        let f = aig.create_and(a, r);
        aig.set_name(f, "f");
        aig.create_named_po(f, "y");
        aig.create_ri(!f);

        aig.cleanup_dangling().unwrap();
        assert_eq!(aig.num_gates(), 1);
        assert_eq!(aig.network_name(), Some("top"));
        assert_eq!(aig.get_name(Signal::from_node(1)), Some("a"));
        assert_eq!(aig.get_name(Signal::from_node(2)), Some("b"));
        assert_eq!(aig.get_name(Signal::from_node(3)), Some("state"));
        assert_eq!(aig.get_name(Signal::from_node(4)), Some("f"));
        assert_eq!(aig.get_output_name(0), Some("y"));
        assert_eq!(aig.ri_at(0).unwrap(), !Signal::from_node(4));
    }
}
