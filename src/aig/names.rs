//! Optional names attached to an [`Aig`]: network name, signal names and output names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Aig, AigError, Result, Signal};

/// Names of a network. Every entry is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTable {
    pub network_name: Option<String>,
    /// Names keyed by signal, so that both polarities of a node can be named separately.
    pub signals: HashMap<Signal, String>,
    /// Names of combinational outputs keyed by output position.
    pub outputs: HashMap<usize, String>,
}

impl NameTable {
    pub fn is_empty(&self) -> bool {
        self.network_name.is_none() && self.signals.is_empty() && self.outputs.is_empty()
    }
}

impl Aig {
    /// Creates a primary input and names it.
    pub fn create_named_pi(&mut self, name: impl Into<String>) -> Signal {
        let pi = self.create_pi();
        self.set_name(pi, name);
        pi
    }

    /// Creates a primary output and names it.
    pub fn create_named_po(&mut self, signal: Signal, name: impl Into<String>) -> usize {
        let index = self.create_po(signal);
        self.names.outputs.insert(index, name.into());
        index
    }

    pub fn set_network_name(&mut self, name: impl Into<String>) {
        self.names.network_name = Some(name.into());
    }

    pub fn network_name(&self) -> Option<&str> {
        self.names.network_name.as_deref()
    }

    pub fn set_name(&mut self, signal: Signal, name: impl Into<String>) {
        self.names.signals.insert(signal, name.into());
    }

    pub fn has_name(&self, signal: Signal) -> bool {
        self.names.signals.contains_key(&signal)
    }

    pub fn get_name(&self, signal: Signal) -> Option<&str> {
        self.names.signals.get(&signal).map(String::as_str)
    }

    /// Names the combinational output at `index`.
    pub fn set_output_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        if index >= self.num_cos() {
            return Err(AigError::PoIndexOutOfRange(index));
        }
        self.names.outputs.insert(index, name.into());
        Ok(())
    }

    pub fn has_output_name(&self, index: usize) -> bool {
        self.names.outputs.contains_key(&index)
    }

    pub fn get_output_name(&self, index: usize) -> Option<&str> {
        self.names.outputs.get(&index).map(String::as_str)
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }
}
