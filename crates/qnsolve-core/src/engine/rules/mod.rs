//! # Conservation Rules Module
//!
//! The physics knowledge of the solver: each rule inspects the quantum
//! numbers flowing into and out of a single interaction vertex and decides
//! whether the combination is allowed.
//!
//! Rules operate on [`EdgeQuantumNumbers`] snapshots rather than on
//! [`crate::core::particle::Particle`] directly, so a rule sees exactly the
//! numbers it is allowed to reason about, including the spin projection the
//! state carries on its edge.
//!
//! A rule that depends on a quantum number some participating state does not
//! define passes vacuously; it never rejects a vertex for lack of data.

mod additive;
mod c_parity;
mod parity;
mod spin;

use crate::core::particle::Particle;
use crate::core::quantum::{InteractionType, Parity, Spin};
use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The quantum numbers of one state on one edge of a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeQuantumNumbers {
    pub pid: i32,
    pub charge: i32,
    pub spin_magnitude: Ratio<i32>,
    pub spin_projection: Ratio<i32>,
    pub parity: Option<Parity>,
    pub c_parity: Option<Parity>,
    pub g_parity: Option<Parity>,
    pub isospin: Option<Spin>,
    pub strangeness: i32,
    pub charmness: i32,
    pub bottomness: i32,
    pub topness: i32,
    pub baryon_number: i32,
    pub electron_lepton_number: i32,
    pub muon_lepton_number: i32,
    pub tau_lepton_number: i32,
}

impl EdgeQuantumNumbers {
    /// Snapshots a particle assigned to an edge with the given spin projection.
    pub fn from_state(particle: &Particle, spin_projection: Ratio<i32>) -> Self {
        Self {
            pid: particle.pid(),
            charge: particle.charge(),
            spin_magnitude: particle.spin(),
            spin_projection,
            parity: particle.parity(),
            c_parity: particle.c_parity(),
            g_parity: particle.g_parity(),
            isospin: particle.isospin(),
            strangeness: particle.strangeness(),
            charmness: particle.charmness(),
            bottomness: particle.bottomness(),
            topness: particle.topness(),
            baryon_number: particle.baryon_number(),
            electron_lepton_number: particle.electron_lepton_number(),
            muon_lepton_number: particle.muon_lepton_number(),
            tau_lepton_number: particle.tau_lepton_number(),
        }
    }

    pub fn is_boson(&self) -> bool {
        self.spin_magnitude.is_integer()
    }

    pub fn is_fermion(&self) -> bool {
        !self.spin_magnitude.is_integer()
    }
}

/// The coupling quantum numbers of the vertex itself: orbital angular
/// momentum `l` between the decay products and their coupled spin `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeQuantumNumbers {
    pub l_magnitude: Ratio<i32>,
    pub s_magnitude: Ratio<i32>,
}

/// A single conservation law checked at an interaction vertex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ConservationRule {
    Charge,
    BaryonNumber,
    ElectronLepton,
    MuonLepton,
    TauLepton,
    Strangeness,
    Charmness,
    Bottomness,
    Topness,
    Parity,
    CParity,
    GParity,
    SpinCoupling,
    Helicity,
    Isospin,
}

impl ConservationRule {
    /// Whether the vertex satisfies this rule.
    pub fn check(
        self,
        incoming: &[EdgeQuantumNumbers],
        outgoing: &[EdgeQuantumNumbers],
        node: &NodeQuantumNumbers,
    ) -> bool {
        match self {
            ConservationRule::Charge => additive::conserved(incoming, outgoing, |e| e.charge),
            ConservationRule::BaryonNumber => {
                additive::conserved(incoming, outgoing, |e| e.baryon_number)
            }
            ConservationRule::ElectronLepton => {
                additive::conserved(incoming, outgoing, |e| e.electron_lepton_number)
            }
            ConservationRule::MuonLepton => {
                additive::conserved(incoming, outgoing, |e| e.muon_lepton_number)
            }
            ConservationRule::TauLepton => {
                additive::conserved(incoming, outgoing, |e| e.tau_lepton_number)
            }
            ConservationRule::Strangeness => {
                additive::conserved(incoming, outgoing, |e| e.strangeness)
            }
            ConservationRule::Charmness => additive::conserved(incoming, outgoing, |e| e.charmness),
            ConservationRule::Bottomness => {
                additive::conserved(incoming, outgoing, |e| e.bottomness)
            }
            ConservationRule::Topness => additive::conserved(incoming, outgoing, |e| e.topness),
            ConservationRule::Parity => parity::parity_conservation(incoming, outgoing, node),
            ConservationRule::CParity => c_parity::c_parity_conservation(incoming, outgoing, node),
            ConservationRule::GParity => parity::g_parity_conservation(incoming, outgoing),
            ConservationRule::SpinCoupling => spin::spin_coupling(incoming, outgoing, node),
            ConservationRule::Helicity => spin::helicity(incoming, outgoing),
            ConservationRule::Isospin => spin::isospin_conservation(incoming, outgoing),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConservationRule::Charge => "charge",
            ConservationRule::BaryonNumber => "baryon number",
            ConservationRule::ElectronLepton => "electron lepton number",
            ConservationRule::MuonLepton => "muon lepton number",
            ConservationRule::TauLepton => "tau lepton number",
            ConservationRule::Strangeness => "strangeness",
            ConservationRule::Charmness => "charmness",
            ConservationRule::Bottomness => "bottomness",
            ConservationRule::Topness => "topness",
            ConservationRule::Parity => "parity",
            ConservationRule::CParity => "C-parity",
            ConservationRule::GParity => "G-parity",
            ConservationRule::SpinCoupling => "spin coupling",
            ConservationRule::Helicity => "helicity",
            ConservationRule::Isospin => "isospin",
        }
    }
}

impl fmt::Display for ConservationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The rules enforced at a vertex of the given interaction type.
///
/// The strong interaction conserves everything this module knows about.
/// Electromagnetic vertices break isospin magnitude and G-parity; weak
/// vertices additionally break flavor, parity and C-parity.
pub fn rule_set(interaction: InteractionType) -> Vec<ConservationRule> {
    use ConservationRule::*;
    match interaction {
        InteractionType::Strong => vec![
            Charge,
            BaryonNumber,
            ElectronLepton,
            MuonLepton,
            TauLepton,
            Strangeness,
            Charmness,
            Bottomness,
            Topness,
            Parity,
            CParity,
            GParity,
            SpinCoupling,
            Helicity,
            Isospin,
        ],
        InteractionType::EM => vec![
            Charge,
            BaryonNumber,
            ElectronLepton,
            MuonLepton,
            TauLepton,
            Strangeness,
            Charmness,
            Bottomness,
            Topness,
            Parity,
            CParity,
            SpinCoupling,
            Helicity,
        ],
        InteractionType::Weak => vec![
            Charge,
            BaryonNumber,
            ElectronLepton,
            MuonLepton,
            TauLepton,
            SpinCoupling,
            Helicity,
        ],
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{node, scalar};
    use super::*;
    use crate::core::quantum::InteractionType;

    #[test]
    fn rule_sets_shrink_with_interaction_strength() {
        let strong = rule_set(InteractionType::Strong);
        let em = rule_set(InteractionType::EM);
        let weak = rule_set(InteractionType::Weak);
        assert!(em.len() < strong.len());
        assert!(weak.len() < em.len());

        assert!(strong.contains(&ConservationRule::Isospin));
        assert!(!em.contains(&ConservationRule::Isospin));
        assert!(!em.contains(&ConservationRule::GParity));
        assert!(!weak.contains(&ConservationRule::Strangeness));
        assert!(!weak.contains(&ConservationRule::Parity));
        for rules in [&strong, &em, &weak] {
            assert!(rules.contains(&ConservationRule::Charge));
            assert!(rules.contains(&ConservationRule::SpinCoupling));
        }
    }

    #[test]
    fn additive_rules_compare_sums() {
        let mut positive = scalar();
        positive.charge = 1;
        let mut negative = scalar();
        negative.charge = -1;

        let vertex = node(0, 0);
        assert!(ConservationRule::Charge.check(
            &[scalar()],
            &[positive.clone(), negative.clone()],
            &vertex
        ));
        assert!(!ConservationRule::Charge.check(&[scalar()], &[positive.clone(), scalar()], &vertex));
        assert!(ConservationRule::Strangeness.check(&[scalar()], &[positive, negative], &vertex));
    }
}
