//! Library of small implementations of 4-input NPN classes, used by cut rewriting.
//!
//! Implementations are computed on first use: every recipe of [`resynthesis`] is run on
//! the canonical representative in a scratch AIG with 4 inputs, and the smallest result
//! (then the shallowest) is kept as an index list.
//!
//! [`resynthesis`]: crate::resynthesis

use std::collections::HashMap;

use log::trace;

use super::npn::Tt16;
use crate::{
    Aig, AigError, Result, Signal,
    depth::DepthView,
    index_list::{IndexList, to_index_list},
    resynthesis::{
        LevelTracker, build_balanced_esop, build_isop, build_shannon, build_xor_decomposition,
    },
    truth_table::TruthTable,
};

type Recipe = fn(&mut Aig, &mut LevelTracker, &TruthTable, &[Signal]) -> Signal;

fn on_set(aig: &mut Aig, levels: &mut LevelTracker, tt: &TruthTable, leaves: &[Signal]) -> Signal {
    build_isop(aig, levels, tt, leaves, false)
}

fn off_set(aig: &mut Aig, levels: &mut LevelTracker, tt: &TruthTable, leaves: &[Signal]) -> Signal {
    build_isop(aig, levels, tt, leaves, true)
}

const RECIPES: [(&str, Recipe); 5] = [
    ("sop", on_set),
    ("pos", off_set),
    ("shannon", build_shannon),
    ("xor", build_xor_decomposition),
    ("esop", build_balanced_esop),
];

/// Cache of the best known implementation of each class representative.
#[derive(Debug, Clone, Default)]
pub struct RewritingLibrary {
    structures: HashMap<Tt16, IndexList>,
}

impl RewritingLibrary {
    pub fn new() -> Self {
        RewritingLibrary::default()
    }

    /// Implementation of `representative` as an index list with 4 inputs and 1 output.
    pub fn get(&mut self, representative: Tt16) -> Result<&IndexList> {
        if !self.structures.contains_key(&representative) {
            let list = Self::synthesize(representative)?;
            self.structures.insert(representative, list);
        }
        self.structures
            .get(&representative)
            .ok_or_else(|| AigError::InvalidState("library entry vanished".to_string()))
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    fn synthesize(representative: Tt16) -> Result<IndexList> {
        let tt = TruthTable::from_u64(4, representative as u64);
        let mut best: Option<((usize, u32), &str, Aig)> = None;
        for (name, recipe) in RECIPES {
            let mut aig = Aig::new();
            let leaves: Vec<Signal> = (0..4).map(|_| aig.create_pi()).collect();
            let mut levels = LevelTracker::new(&aig);
            let out = recipe(&mut aig, &mut levels, &tt, &leaves);
            aig.create_po(out);
            aig.cleanup_dangling()?;
            let cost = (aig.num_gates(), DepthView::new(&aig).num_levels());
            if best.as_ref().is_none_or(|(best_cost, _, _)| cost < *best_cost) {
                best = Some((cost, name, aig));
            }
        }
        let Some((cost, name, aig)) = best else {
            return Err(AigError::InvalidState("no resynthesis recipe".to_string()));
        };
        trace!("library: class {representative:04x} uses {name} with {} gates", cost.0);
        to_index_list(&aig)
    }
}
