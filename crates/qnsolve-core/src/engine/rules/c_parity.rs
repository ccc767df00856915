use super::parity::orbital_parity;
use super::{EdgeQuantumNumbers, NodeQuantumNumbers};
use crate::core::quantum::Parity;

fn c_parity_product(states: &[EdgeQuantumNumbers]) -> Option<Parity> {
    states
        .iter()
        .map(|e| e.c_parity)
        .try_fold(Parity::Positive, |product, p| Some(product * p?))
}

/// The C-parity of a particle-antiparticle pair, derived from the coupling
/// quantum numbers of the vertex that produces it: `(-1)^l` for a boson
/// pair, `(-1)^(l+s)` for a fermion pair.
fn derived_pair_c_parity(
    pair: &[EdgeQuantumNumbers],
    node: &NodeQuantumNumbers,
) -> Option<Parity> {
    let [first, second] = pair else {
        return None;
    };
    // particle-antiparticle pairs are identified by opposite pids
    if first.pid == 0 || first.pid != -second.pid {
        return None;
    }
    let orbital = orbital_parity(node.l_magnitude)?;
    if first.is_boson() && second.is_boson() {
        Some(orbital)
    } else if first.is_fermion() && second.is_fermion() {
        Some(orbital * orbital_parity(node.s_magnitude)?)
    } else {
        None
    }
}

/// C-parity conservation at a vertex.
///
/// When every participating state defines a C-parity this is the plain
/// multiplicative law. A two-body final state without defined C-parities can
/// still be checked if it is a particle-antiparticle pair, whose combined
/// C-parity follows from `l` and `s`. Anything else passes vacuously.
pub(super) fn c_parity_conservation(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
    node: &NodeQuantumNumbers,
) -> bool {
    if let (Some(product_in), Some(product_out)) =
        (c_parity_product(incoming), c_parity_product(outgoing))
    {
        return product_in == product_out;
    }
    if incoming.len() == 1 && outgoing.len() == 2 {
        if let (Some(c_in), Some(c_pair)) = (
            incoming[0].c_parity,
            derived_pair_c_parity(outgoing, node),
        ) {
            return c_in == c_pair;
        }
    }
    true
}
