//! # Particle Module
//!
//! Immutable particle descriptions and the collection type that serves as the
//! read-only particle database during a search.
//!
//! A [`Particle`] is a pure value: a set of quantum numbers plus the labels
//! (`name`, `pid`) used to refer to it. Equality and hashing deliberately
//! ignore the labels, so two database entries that describe the same physical
//! state compare equal no matter what they are called.

pub mod collection;

pub use collection::ParticleCollection;

use crate::core::quantum::{halves, whole, Parity, Spin, SpinError};
use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// A particle assigned to a graph edge together with its spin projection.
pub type ParticleWithSpin = (Particle, Ratio<i32>);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParticleError {
    #[error(
        "particle {name:?} fails the Gell-Mann-Nishijima relation: charge {charge} != \
         isospin projection {isospin_projection} + (B + S + C + B' + T)/2 = {expected}"
    )]
    GellMannNishijima {
        name: String,
        charge: i32,
        isospin_projection: Ratio<i32>,
        expected: Ratio<i32>,
    },

    #[error("added particle {new:?} is equivalent to existing particle {existing:?}")]
    EquivalentParticle { new: String, existing: String },

    #[error("particle {0:?} already exists in the collection with different quantum numbers")]
    DuplicateName(String),

    #[error("no particle named {query:?} in the collection; did you mean one of {candidates:?}?")]
    NotFound {
        query: String,
        candidates: Vec<String>,
    },

    #[error("no particle with pid {0} in the collection")]
    PidNotFound(i32),

    #[error(transparent)]
    Spin(#[from] SpinError),
}

/// An immutable description of a particle species.
///
/// Quantum numbers that are undefined for a species (e.g. C-parity for a
/// charged pion) are `None`. Flavor quantum numbers and lepton numbers
/// default to zero.
///
/// The Gell-Mann-Nishijima relation between charge, isospin projection and
/// the flavor quantum numbers is checked at construction time whenever an
/// isospin is given; a violating combination cannot be constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    name: String,
    pid: i32,
    mass: f64,
    width: f64,
    spin: Ratio<i32>,
    charge: i32,
    isospin: Option<Spin>,
    parity: Option<Parity>,
    c_parity: Option<Parity>,
    g_parity: Option<Parity>,
    strangeness: i32,
    charmness: i32,
    bottomness: i32,
    topness: i32,
    baryon_number: i32,
    electron_lepton_number: i32,
    muon_lepton_number: i32,
    tau_lepton_number: i32,
}

impl Particle {
    /// Starts building a particle with the given labels.
    pub fn builder(name: &str, pid: i32) -> ParticleBuilder {
        ParticleBuilder::new(name, pid)
    }

    /// A builder pre-filled with this particle's values, for derived species.
    pub fn to_builder(&self) -> ParticleBuilder {
        ParticleBuilder {
            name: self.name.clone(),
            pid: self.pid,
            mass: self.mass,
            width: self.width,
            spin: self.spin,
            charge: self.charge,
            isospin: self.isospin,
            parity: self.parity,
            c_parity: self.c_parity,
            g_parity: self.g_parity,
            strangeness: self.strangeness,
            charmness: self.charmness,
            bottomness: self.bottomness,
            topness: self.topness,
            baryon_number: self.baryon_number,
            electron_lepton_number: self.electron_lepton_number,
            muon_lepton_number: self.muon_lepton_number,
            tau_lepton_number: self.tau_lepton_number,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Spin magnitude.
    pub fn spin(&self) -> Ratio<i32> {
        self.spin
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn isospin(&self) -> Option<Spin> {
        self.isospin
    }

    pub fn parity(&self) -> Option<Parity> {
        self.parity
    }

    pub fn c_parity(&self) -> Option<Parity> {
        self.c_parity
    }

    pub fn g_parity(&self) -> Option<Parity> {
        self.g_parity
    }

    pub fn strangeness(&self) -> i32 {
        self.strangeness
    }

    pub fn charmness(&self) -> i32 {
        self.charmness
    }

    pub fn bottomness(&self) -> i32 {
        self.bottomness
    }

    pub fn topness(&self) -> i32 {
        self.topness
    }

    pub fn baryon_number(&self) -> i32 {
        self.baryon_number
    }

    pub fn electron_lepton_number(&self) -> i32 {
        self.electron_lepton_number
    }

    pub fn muon_lepton_number(&self) -> i32 {
        self.muon_lepton_number
    }

    pub fn tau_lepton_number(&self) -> i32 {
        self.tau_lepton_number
    }

    pub fn is_lepton(&self) -> bool {
        self.electron_lepton_number != 0
            || self.muon_lepton_number != 0
            || self.tau_lepton_number != 0
    }

    pub fn is_boson(&self) -> bool {
        self.spin.is_integer()
    }

    pub fn is_fermion(&self) -> bool {
        !self.spin.is_integer()
    }

    /// The family name of the particle: parenthesized groups, digits, charge
    /// markers and the antiparticle tilde are stripped (`"f(0)(980)"` becomes
    /// `"f"`, `"J/psi(1S)"` becomes `"J/psi"`).
    pub fn name_root(&self) -> String {
        name_root(&self.name)
    }

    /// The spin projections this particle can carry on a graph edge.
    ///
    /// All projections from `-spin` to `+spin` in integer steps; massless
    /// particles with spin (e.g. the photon) have no longitudinal projection,
    /// so zero is excluded for them.
    pub fn allowed_spin_projections(&self) -> Vec<Ratio<i32>> {
        let mut projections = Vec::new();
        let mut projection = -self.spin;
        while projection <= self.spin {
            let is_forbidden_longitudinal =
                self.mass == 0.0 && self.spin > whole(0) && projection == whole(0);
            if !is_forbidden_longitudinal {
                projections.push(projection);
            }
            projection += whole(1);
        }
        projections
    }
}

// Name and pid are labels, not identity: two entries with matching quantum
// numbers are the same physical state.
impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.mass == other.mass
            && self.width == other.width
            && self.spin == other.spin
            && self.charge == other.charge
            && self.isospin == other.isospin
            && self.parity == other.parity
            && self.c_parity == other.c_parity
            && self.g_parity == other.g_parity
            && self.strangeness == other.strangeness
            && self.charmness == other.charmness
            && self.bottomness == other.bottomness
            && self.topness == other.topness
            && self.baryon_number == other.baryon_number
            && self.electron_lepton_number == other.electron_lepton_number
            && self.muon_lepton_number == other.muon_lepton_number
            && self.tau_lepton_number == other.tau_lepton_number
    }
}

impl Eq for Particle {}

impl Hash for Particle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mass.to_bits().hash(state);
        self.width.to_bits().hash(state);
        self.spin.hash(state);
        self.charge.hash(state);
        self.isospin.hash(state);
        self.parity.hash(state);
        self.c_parity.hash(state);
        self.g_parity.hash(state);
        self.strangeness.hash(state);
        self.charmness.hash(state);
        self.bottomness.hash(state);
        self.topness.hash(state);
        self.baryon_number.hash(state);
        self.electron_lepton_number.hash(state);
        self.muon_lepton_number.hash(state);
        self.tau_lepton_number.hash(state);
    }
}

impl PartialOrd for Particle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Particle {
    /// Sorts by family name, then mass, then charge, with the full name and
    /// pid as final tiebreakers so the order is total.
    fn cmp(&self, other: &Self) -> Ordering {
        self.name_root()
            .cmp(&other.name_root())
            .then_with(|| {
                self.mass
                    .partial_cmp(&other.mass)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.charge.cmp(&other.charge))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.pid.cmp(&other.pid))
    }
}

/// Strips parenthesized groups, digits, charge markers, primes, stars and the
/// antiparticle tilde from a particle name.
pub fn name_root(name: &str) -> String {
    let without_groups = match (name.find('('), name.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{}", &name[..open], &name[close + 1..])
        }
        _ => name.to_string(),
    };
    without_groups
        .chars()
        .filter(|c| !matches!(c, '0'..='9' | '+' | '-' | '~' | '*' | '\''))
        .collect()
}

/// Builder for [`Particle`]; `build` runs the construction invariants.
#[derive(Debug, Clone)]
pub struct ParticleBuilder {
    name: String,
    pid: i32,
    mass: f64,
    width: f64,
    spin: Ratio<i32>,
    charge: i32,
    isospin: Option<Spin>,
    parity: Option<Parity>,
    c_parity: Option<Parity>,
    g_parity: Option<Parity>,
    strangeness: i32,
    charmness: i32,
    bottomness: i32,
    topness: i32,
    baryon_number: i32,
    electron_lepton_number: i32,
    muon_lepton_number: i32,
    tau_lepton_number: i32,
}

impl ParticleBuilder {
    pub fn new(name: &str, pid: i32) -> Self {
        Self {
            name: name.to_string(),
            pid,
            mass: 0.0,
            width: 0.0,
            spin: whole(0),
            charge: 0,
            isospin: None,
            parity: None,
            c_parity: None,
            g_parity: None,
            strangeness: 0,
            charmness: 0,
            bottomness: 0,
            topness: 0,
            baryon_number: 0,
            electron_lepton_number: 0,
            muon_lepton_number: 0,
            tau_lepton_number: 0,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
    pub fn pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
    pub fn spin(mut self, magnitude: Ratio<i32>) -> Self {
        self.spin = magnitude;
        self
    }
    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }
    pub fn isospin(mut self, isospin: Spin) -> Self {
        self.isospin = Some(isospin);
        self
    }
    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }
    pub fn c_parity(mut self, c_parity: Parity) -> Self {
        self.c_parity = Some(c_parity);
        self
    }
    pub fn g_parity(mut self, g_parity: Parity) -> Self {
        self.g_parity = Some(g_parity);
        self
    }
    pub fn strangeness(mut self, strangeness: i32) -> Self {
        self.strangeness = strangeness;
        self
    }
    pub fn charmness(mut self, charmness: i32) -> Self {
        self.charmness = charmness;
        self
    }
    pub fn bottomness(mut self, bottomness: i32) -> Self {
        self.bottomness = bottomness;
        self
    }
    pub fn topness(mut self, topness: i32) -> Self {
        self.topness = topness;
        self
    }
    pub fn baryon_number(mut self, baryon_number: i32) -> Self {
        self.baryon_number = baryon_number;
        self
    }
    pub fn electron_lepton_number(mut self, number: i32) -> Self {
        self.electron_lepton_number = number;
        self
    }
    pub fn muon_lepton_number(mut self, number: i32) -> Self {
        self.muon_lepton_number = number;
        self
    }
    pub fn tau_lepton_number(mut self, number: i32) -> Self {
        self.tau_lepton_number = number;
        self
    }

    /// Finalizes the particle.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::GellMannNishijima`] if an isospin is set and
    /// the charge does not match the isospin projection plus half the sum of
    /// baryon and flavor quantum numbers.
    pub fn build(self) -> Result<Particle, ParticleError> {
        if let Some(isospin) = self.isospin {
            let flavor_sum = self.baryon_number
                + self.strangeness
                + self.charmness
                + self.bottomness
                + self.topness;
            let expected = isospin.projection() + halves(flavor_sum);
            if whole(self.charge) != expected {
                return Err(ParticleError::GellMannNishijima {
                    name: self.name,
                    charge: self.charge,
                    isospin_projection: isospin.projection(),
                    expected,
                });
            }
        }
        Ok(Particle {
            name: self.name,
            pid: self.pid,
            mass: self.mass,
            width: self.width,
            spin: self.spin,
            charge: self.charge,
            isospin: self.isospin,
            parity: self.parity,
            c_parity: self.c_parity,
            g_parity: self.g_parity,
            strangeness: self.strangeness,
            charmness: self.charmness,
            bottomness: self.bottomness,
            topness: self.topness,
            baryon_number: self.baryon_number,
            electron_lepton_number: self.electron_lepton_number,
            muon_lepton_number: self.muon_lepton_number,
            tau_lepton_number: self.tau_lepton_number,
        })
    }
}

/// Derives the antiparticle of `template` under the given name.
///
/// The pid, charge, baryon number, flavor and lepton numbers and the isospin
/// projection change sign; C- and G-parity are unchanged. Spatial parity
/// flips for fermions only, so applying this twice reproduces the original
/// particle.
pub fn create_antiparticle(template: &Particle, new_name: &str) -> Result<Particle, ParticleError> {
    let parity = template.parity.map(|p| {
        if template.is_fermion() {
            -p
        } else {
            p
        }
    });
    let mut builder = template
        .to_builder()
        .name(new_name)
        .pid(-template.pid)
        .charge(-template.charge)
        .strangeness(-template.strangeness)
        .charmness(-template.charmness)
        .bottomness(-template.bottomness)
        .topness(-template.topness)
        .baryon_number(-template.baryon_number)
        .electron_lepton_number(-template.electron_lepton_number)
        .muon_lepton_number(-template.muon_lepton_number)
        .tau_lepton_number(-template.tau_lepton_number);
    builder.parity = parity;
    if let Some(isospin) = template.isospin {
        builder = builder.isospin(-isospin);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi_plus() -> Particle {
        Particle::builder("pi+", 211)
            .mass(0.139_570_39)
            .spin(whole(0))
            .charge(1)
            .isospin(Spin::new(whole(1), whole(1)).unwrap())
            .parity(Parity::Negative)
            .g_parity(Parity::Negative)
            .build()
            .unwrap()
    }

    fn proton() -> Particle {
        Particle::builder("p", 2212)
            .mass(0.938_272_08)
            .spin(halves(1))
            .charge(1)
            .isospin(Spin::new(halves(1), halves(1)).unwrap())
            .parity(Parity::Positive)
            .baryon_number(1)
            .build()
            .unwrap()
    }

    #[test]
    fn gell_mann_nishijima_violation_is_a_construction_error() {
        let result = Particle::builder("broken", 666)
            .spin(whole(1))
            .charge(0)
            .isospin(Spin::new(whole(0), whole(0)).unwrap())
            .charmness(1)
            .build();
        assert!(matches!(
            result,
            Err(ParticleError::GellMannNishijima { .. })
        ));
    }

    #[test]
    fn gell_mann_nishijima_is_skipped_without_isospin() {
        let electron = Particle::builder("e-", 11)
            .mass(0.000_510_999)
            .spin(halves(1))
            .charge(-1)
            .electron_lepton_number(1)
            .build()
            .unwrap();
        assert!(electron.is_lepton());
        assert!(electron.is_fermion());
    }

    #[test]
    fn equality_ignores_name_and_pid() {
        let original = pi_plus();
        let relabeled = original
            .to_builder()
            .name("some other label")
            .pid(753)
            .build()
            .unwrap();
        assert_eq!(original, relabeled);
        assert_ne!(original.name(), relabeled.name());
        assert_ne!(original.pid(), relabeled.pid());

        let heavier = original.to_builder().mass(1.5).build().unwrap();
        assert_ne!(original, heavier);
    }

    #[test]
    fn antiparticle_round_trip_restores_the_original() {
        for particle in [pi_plus(), proton()] {
            let anti = create_antiparticle(&particle, "anti").unwrap();
            let back = create_antiparticle(&anti, particle.name()).unwrap();
            assert_eq!(back, particle);
            assert_eq!(back.pid(), particle.pid());
        }
    }

    #[test]
    fn antiparticle_flips_charge_flavor_and_isospin_projection() {
        let anti = create_antiparticle(&proton(), "p~").unwrap();
        assert_eq!(anti.pid(), -2212);
        assert_eq!(anti.charge(), -1);
        assert_eq!(anti.baryon_number(), -1);
        assert_eq!(anti.isospin().unwrap().projection(), halves(-1));
        // fermion: spatial parity flips
        assert_eq!(anti.parity(), Some(Parity::Negative));
    }

    #[test]
    fn antiparticle_keeps_boson_parity() {
        let anti = create_antiparticle(&pi_plus(), "pi-").unwrap();
        assert_eq!(anti.parity(), Some(Parity::Negative));
        assert_eq!(anti.g_parity(), Some(Parity::Negative));
        assert_eq!(anti.charge(), -1);
    }

    #[test]
    fn name_root_strips_decorations() {
        assert_eq!(name_root("J/psi(1S)"), "J/psi");
        assert_eq!(name_root("f(0)(980)"), "f");
        assert_eq!(name_root("pi0"), "pi");
        assert_eq!(name_root("a(0)(980)-"), "a");
        assert_eq!(name_root("nu(tau)~"), "nu");
        assert_eq!(name_root("K(2)*(1980)+"), "K");
    }

    #[test]
    fn ordering_is_by_name_root_then_mass_then_charge() {
        let pi0 = Particle::builder("pi0", 111)
            .mass(0.134_976_8)
            .spin(whole(0))
            .isospin(Spin::new(whole(1), whole(0)).unwrap())
            .parity(Parity::Negative)
            .c_parity(Parity::Positive)
            .g_parity(Parity::Negative)
            .build()
            .unwrap();
        let a0_minus = Particle::builder("a(0)(980)-", -9000211)
            .mass(0.98)
            .spin(whole(0))
            .charge(-1)
            .isospin(Spin::new(whole(1), whole(-1)).unwrap())
            .parity(Parity::Positive)
            .build()
            .unwrap();
        assert!(pi0 > a0_minus, "pi family sorts after a family");
        assert!(pi_plus() > pi0, "heavier pion sorts later");

        let pi_minus = create_antiparticle(&pi_plus(), "pi-").unwrap();
        assert!(pi_plus() > pi_minus, "same mass resolves by charge");
    }

    #[test]
    fn allowed_spin_projections_excludes_longitudinal_for_massless() {
        let gamma = Particle::builder("gamma", 22)
            .spin(whole(1))
            .c_parity(Parity::Negative)
            .build()
            .unwrap();
        assert_eq!(gamma.allowed_spin_projections(), vec![whole(-1), whole(1)]);

        let rho = Particle::builder("rho(770)0", 113)
            .mass(0.775_26)
            .spin(whole(1))
            .isospin(Spin::new(whole(1), whole(0)).unwrap())
            .build()
            .unwrap();
        assert_eq!(
            rho.allowed_spin_projections(),
            vec![whole(-1), whole(0), whole(1)]
        );
    }
}
