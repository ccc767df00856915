use super::EdgeQuantumNumbers;
use super::NodeQuantumNumbers;
use num_rational::Ratio;
use crate::core::quantum::whole;

fn abs(value: Ratio<i32>) -> Ratio<i32> {
    if value < whole(0) { -value } else { value }
}

/// Whether `c` is a valid SU(2) coupling of `a` and `b`: it lies in the
/// triangle range `|a - b| ..= a + b` and differs from the endpoints by an
/// integer.
pub(super) fn triangle(a: Ratio<i32>, b: Ratio<i32>, c: Ratio<i32>) -> bool {
    c >= abs(a - b) && c <= a + b && (a + b - c).is_integer()
}

/// Spin coupling at a two-body decay vertex: the daughter spins have to
/// couple to the vertex `s`, and `s` with the orbital momentum `l` has to
/// reach the parent spin. Other vertex shapes pass vacuously.
pub(super) fn spin_coupling(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
    node: &NodeQuantumNumbers,
) -> bool {
    let ([parent], [first, second]) = (incoming, outgoing) else {
        return true;
    };
    triangle(first.spin_magnitude, second.spin_magnitude, node.s_magnitude)
        && triangle(node.s_magnitude, node.l_magnitude, parent.spin_magnitude)
}

/// Helicity limit at a two-body decay vertex: the difference of the daughter
/// helicities cannot exceed the parent spin.
pub(super) fn helicity(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
) -> bool {
    let ([parent], [first, second]) = (incoming, outgoing) else {
        return true;
    };
    abs(first.spin_projection - second.spin_projection) <= parent.spin_magnitude
}

/// Isospin conservation at a two-body decay vertex: triangle rule for the
/// magnitudes and additivity of the projections. Checked only when all three
/// states define an isospin.
pub(super) fn isospin_conservation(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
) -> bool {
    let ([parent], [first, second]) = (incoming, outgoing) else {
        return true;
    };
    let (Some(i_parent), Some(i_first), Some(i_second)) =
        (parent.isospin, first.isospin, second.isospin)
    else {
        return true;
    };
    triangle(i_first.magnitude(), i_second.magnitude(), i_parent.magnitude())
        && i_parent.projection() == i_first.projection() + i_second.projection()
}
