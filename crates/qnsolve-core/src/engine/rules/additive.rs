use super::EdgeQuantumNumbers;

/// An additively conserved quantum number: the sum over the incoming states
/// equals the sum over the outgoing ones.
pub(super) fn conserved(
    incoming: &[EdgeQuantumNumbers],
    outgoing: &[EdgeQuantumNumbers],
    quantity: impl Fn(&EdgeQuantumNumbers) -> i32,
) -> bool {
    let sum_in: i32 = incoming.iter().map(&quantity).sum();
    let sum_out: i32 = outgoing.iter().map(&quantity).sum();
    sum_in == sum_out
}
