//! Registers: register outputs are combinational inputs, register inputs are combinational
//! outputs, and both pair up by creation order.

use serde::{Deserialize, Serialize};

use super::{Aig, AigError, AigNode, NodeId, Result, Signal};

/// Metadata of a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Initial value: 0, 1, or 3 for undefined.
    pub init: u8,
    pub control: Option<String>,
    pub edge: Option<String>,
}

impl Default for Register {
    fn default() -> Self {
        Register {
            init: 3,
            control: None,
            edge: None,
        }
    }
}

impl Aig {
    /// Appends a register output, with default register metadata.
    pub fn create_ro(&mut self) -> Signal {
        let id = self.push_node(AigNode::Ro(self.ros.len()));
        self.ros.push(id);
        self.registers.push(Register::default());
        Signal::from_node(id)
    }

    /// Appends a register input and returns its index among register inputs.
    ///
    /// # Panics
    ///
    /// If `signal` does not reference a live node, see [`Aig::try_create_ri`].
    pub fn create_ri(&mut self, signal: Signal) -> usize {
        assert!(
            self.is_live(signal.node()),
            "register input driven by missing node {}",
            signal.node()
        );
        self.refs[signal.node()] += 1;
        self.ris.push(signal);
        self.ris.len() - 1
    }

    /// Checked version of [`Aig::create_ri`].
    pub fn try_create_ri(&mut self, signal: Signal) -> Result<usize> {
        self.check_signal(signal)?;
        Ok(self.create_ri(signal))
    }

    pub fn num_registers(&self) -> usize {
        self.ros.len()
    }

    pub fn is_ro(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(AigNode::is_ro)
    }

    /// True iff no register exists.
    pub fn is_combinational(&self) -> bool {
        self.ros.is_empty()
    }

    /// Register outputs in creation order.
    pub fn ros(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ros.iter().copied()
    }

    /// Register inputs in creation order.
    pub fn ris(&self) -> impl Iterator<Item = Signal> + '_ {
        self.ris.iter().copied()
    }

    pub fn ro_at(&self, index: usize) -> Result<Signal> {
        self.ros
            .get(index)
            .map(|&id| Signal::from_node(id))
            .ok_or(AigError::RegisterIndexOutOfRange(index))
    }

    pub fn ri_at(&self, index: usize) -> Result<Signal> {
        self.ris
            .get(index)
            .copied()
            .ok_or(AigError::RegisterIndexOutOfRange(index))
    }

    pub fn register_at(&self, index: usize) -> Result<&Register> {
        self.registers
            .get(index)
            .ok_or(AigError::RegisterIndexOutOfRange(index))
    }

    pub fn set_register(&mut self, index: usize, register: Register) -> Result<()> {
        let slot = self
            .registers
            .get_mut(index)
            .ok_or(AigError::RegisterIndexOutOfRange(index))?;
        *slot = register;
        Ok(())
    }

    /// Fails unless every register output has its register input.
    pub(crate) fn check_register_pairing(&self) -> Result<()> {
        if self.ros.len() != self.ris.len() {
            return Err(AigError::Sequential(format!(
                "{} register outputs but {} register inputs",
                self.ros.len(),
                self.ris.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_bookkeeping_test() {
        let mut aig = Aig::new();
        let x = aig.create_pi();
        let r0 = aig.create_ro();
        let r1 = aig.create_ro();
        assert_eq!(aig.num_registers(), 2);
        assert_eq!(aig.num_cis(), 3);
        assert!(!aig.is_combinational());
        assert!(aig.is_ro(r0.node()));
        assert!(aig.is_ci(r1.node()));
        assert_eq!(aig.ci_index(r1.node()), Some(2));
        assert!(aig.check_register_pairing().is_err());

        let f = aig.create_and(x, r0);
        let g = aig.create_xor(r0, r1);
        aig.create_po(f);
        assert_eq!(aig.create_ri(f), 0);
        assert_eq!(aig.create_ri(!g), 1);
        assert!(aig.check_register_pairing().is_ok());
        assert_eq!(aig.num_cos(), 3);
        assert_eq!(aig.co_at(2), Some(!g));
        assert_eq!(aig.ri_at(1).unwrap(), !g);
        assert_eq!(aig.fanout_size(f.node()), 2);
    }

    #[test]
    fn register_metadata_test() {
        let mut aig = Aig::new();
        aig.create_ro();
        assert_eq!(aig.register_at(0).unwrap().init, 3);
        aig.set_register(
            0,
            Register {
                init: 1,
                control: Some("clk".to_string()),
                edge: None,
            },
        )
        .unwrap();
        assert_eq!(aig.register_at(0).unwrap().init, 1);
        assert_eq!(aig.register_at(0).unwrap().control.as_deref(), Some("clk"));
        assert!(matches!(
            aig.register_at(1),
            Err(AigError::RegisterIndexOutOfRange(1))
        ));
    }
}
