use super::{EdgeQuantumNumbers, NodeQuantumNumbers};
use crate::core::quantum::Parity;
use num_rational::Ratio;

/// `(-1)^l` as a parity, defined for integer `l` only.
pub(super) fn orbital_parity(l_magnitude: Ratio<i32>) -> Option<Parity> {
    if !l_magnitude.is_integer() {
        return None;
    }
    if l_magnitude.to_integer() % 2 == 0 {
        Some(Parity::Positive)
    } else {
        Some(Parity::Negative)
    }
}

fn parity_product(states: &[EdgeQuantumNumbers], parity: impl Fn(&EdgeQuantumNumbers) -> Option<Parity>) -> Option<Parity> {
    states
        .iter()
        .map(parity)
        .try_fold(Parity::Positive, |product, p| Some(product * p?))
}

/// Spatial parity conservation: the intrinsic parity of the incoming states
/// has to match the outgoing intrinsic parities times the orbital factor
/// `(-1)^l`. Passes vacuously if any participating state has no defined
/// parity.
pub(super) fn parity_conservation(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
    node: &NodeQuantumNumbers,
) -> bool {
    let (Some(product_in), Some(product_out)) = (
        parity_product(incoming, |e| e.parity),
        parity_product(outgoing, |e| e.parity),
    ) else {
        return true;
    };
    let Some(orbital) = orbital_parity(node.l_magnitude) else {
        return true;
    };
    product_in == product_out * orbital
}

/// G-parity conservation as a plain multiplicative law, checked only when
/// every participating state defines a G-parity.
pub(super) fn g_parity_conservation(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
) -> bool {
    match (
        parity_product(incoming, |e| e.g_parity),
        parity_product(outgoing, |e| e.g_parity),
    ) {
        (Some(product_in), Some(product_out)) => product_in == product_out,
        _ => true,
    }
}
