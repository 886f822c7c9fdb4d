//! Simulation of AIGs: exhaustive truth tables, single patterns and bit-parallel words.
//!
//! Combinational inputs are the simulation variables: primary inputs first, then register
//! outputs, which are therefore treated as free variables.

use log::warn;

use crate::{
    Aig, AigError, AigNode, NodeId, Result, Signal,
    dfs::all_gates_topological,
    truth_table::{MAX_VARS, TruthTable, TruthTableError},
};

/// Above this number of inputs, exhaustive simulation gets expensive.
const LARGE_SIMULATION: usize = 16;

/// Gates in an order where fanins come first.
///
/// Creation order is used as long as it is topological, which is the case until a
/// substitution redirects a gate to a younger node.
pub(crate) fn evaluation_order(aig: &Aig) -> Vec<NodeId> {
    let in_creation_order = aig
        .gates()
        .all(|g| aig.fanins(g).iter().all(|f| f.node() < g));
    if in_creation_order {
        aig.gates().collect()
    } else {
        all_gates_topological(aig).unwrap_or_else(|_| aig.gates().collect())
    }
}

fn signal_value(values: &[TruthTable], signal: Signal) -> TruthTable {
    let tt = &values[signal.node()];
    if signal.is_complemented() { !tt } else { tt.clone() }
}

/// Truth table of every node over the combinational inputs, indexed by node id.
///
/// Tables are not complemented. Dead nodes get the constant false table.
///
/// Panics if the AIG has more than [`MAX_VARS`] combinational inputs, see
/// [`try_simulate_nodes`].
pub fn simulate_nodes(aig: &Aig) -> Vec<TruthTable> {
    let num_vars = aig.num_cis();
    if num_vars > LARGE_SIMULATION {
        warn!("exhaustive simulation over {num_vars} inputs");
    }
    let mut values = vec![TruthTable::const0(num_vars); aig.size()];
    for (var, ci) in aig.cis().enumerate() {
        values[ci] = TruthTable::nth_var(num_vars, var);
    }
    for gate in evaluation_order(aig) {
        if let Some(AigNode::And([a, b])) = aig.node(gate) {
            values[gate] = signal_value(&values, *a) & signal_value(&values, *b);
        }
    }
    values
}

/// Truth table of every primary output, output complement applied.
///
/// ```rust
/// use aigsynth::{Aig, simulation::simulate};
/// let mut aig = Aig::new();
/// let a = aig.create_pi();
/// let b = aig.create_pi();
/// let f = aig.create_or(a, b);
/// aig.create_po(f);
/// assert_eq!(simulate(&aig)[0].to_binary(), "1110");
/// ```
pub fn simulate(aig: &Aig) -> Vec<TruthTable> {
    let values = simulate_nodes(aig);
    aig.pos().map(|po| signal_value(&values, po)).collect()
}

/// Truth tables of every combinational output (primary outputs then register inputs).
pub fn simulate_cos(aig: &Aig) -> Vec<TruthTable> {
    let values = simulate_nodes(aig);
    aig.cos().map(|co| signal_value(&values, co)).collect()
}

/// Checked version of [`simulate_nodes`].
pub fn try_simulate_nodes(aig: &Aig) -> Result<Vec<TruthTable>> {
    if aig.num_cis() > MAX_VARS {
        return Err(TruthTableError::TooManyVariables(aig.num_cis()).into());
    }
    Ok(simulate_nodes(aig))
}

/// Checked version of [`simulate`].
pub fn try_simulate(aig: &Aig) -> Result<Vec<TruthTable>> {
    let values = try_simulate_nodes(aig)?;
    Ok(aig.pos().map(|po| signal_value(&values, po)).collect())
}

/// Checked version of [`simulate_cos`].
pub fn try_simulate_cos(aig: &Aig) -> Result<Vec<TruthTable>> {
    let values = try_simulate_nodes(aig)?;
    Ok(aig.cos().map(|co| signal_value(&values, co)).collect())
}

/// Value of every primary output under one assignment of the combinational inputs.
pub fn simulate_pattern(aig: &Aig, inputs: &[bool]) -> Result<Vec<bool>> {
    let words: Vec<u64> = inputs.iter().map(|&b| if b { u64::MAX } else { 0 }).collect();
    let values = simulate_words(aig, &words)?;
    Ok(aig
        .pos()
        .map(|po| (values[po.node()] ^ if po.is_complemented() { u64::MAX } else { 0 }) & 1 == 1)
        .collect())
}

/// Bit-parallel simulation of 64 patterns: one word per combinational input.
///
/// Returns one word per node, indexed by node id, not complemented.
pub fn simulate_words(aig: &Aig, input_words: &[u64]) -> Result<Vec<u64>> {
    if input_words.len() != aig.num_cis() {
        return Err(AigError::WrongInputCount {
            expected: aig.num_cis(),
            found: input_words.len(),
        });
    }
    let mut values = vec![0u64; aig.size()];
    for (ci, &word) in aig.cis().zip(input_words) {
        values[ci] = word;
    }
    for gate in evaluation_order(aig) {
        if let Some(AigNode::And([a, b])) = aig.node(gate) {
            values[gate] = word_value(&values, *a) & word_value(&values, *b);
        }
    }
    Ok(values)
}

/// Word of a signal given the node words.
pub fn word_value(values: &[u64], signal: Signal) -> u64 {
    let word = values[signal.node()];
    if signal.is_complemented() { !word } else { word }
}
