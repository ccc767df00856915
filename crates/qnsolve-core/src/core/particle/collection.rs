use super::{name_root, Particle, ParticleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// A set of particles unique by name, used as the read-only database that a
/// search runs against.
///
/// Iteration order is alphabetical by name, which keeps every downstream
/// enumeration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleCollection {
    particles: BTreeMap<String, Particle>,
}

impl ParticleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.particles.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Particle> {
        self.particles.get(name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.particles.contains_key(name)
    }

    pub fn contains_pid(&self, pid: i32) -> bool {
        self.particles.values().any(|p| p.pid() == pid)
    }

    pub fn contains(&self, particle: &Particle) -> bool {
        self.particles.values().any(|p| p == particle)
    }

    /// Adds a particle to the collection.
    ///
    /// # Errors
    ///
    /// - [`ParticleError::EquivalentParticle`] if a member with the exact same
    ///   quantum numbers already exists (under any name).
    /// - [`ParticleError::DuplicateName`] if the name is taken by a member
    ///   with different quantum numbers.
    ///
    /// A duplicate pid is legal but suspicious and is logged as a warning.
    pub fn add(&mut self, particle: Particle) -> Result<(), ParticleError> {
        if let Some(existing) = self.particles.values().find(|p| **p == particle) {
            return Err(ParticleError::EquivalentParticle {
                new: particle.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        if self.particles.contains_key(particle.name()) {
            return Err(ParticleError::DuplicateName(particle.name().to_string()));
        }
        if let Some(existing) = self.particles.values().find(|p| p.pid() == particle.pid()) {
            warn!(
                pid = particle.pid(),
                new = particle.name(),
                existing = existing.name(),
                "pid is already taken by another particle"
            );
        }
        self.particles
            .insert(particle.name().to_string(), particle);
        Ok(())
    }

    /// Adds every particle of `other`, failing on the first conflict.
    pub fn extend(&mut self, other: ParticleCollection) -> Result<(), ParticleError> {
        for particle in other.particles.into_values() {
            self.add(particle)?;
        }
        Ok(())
    }

    /// Removes a particle by name; returns it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Particle> {
        self.particles.remove(name)
    }

    /// Looks a particle up by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::NotFound`] carrying fuzzy-matched candidate
    /// names ("did you mean") when the exact name is absent.
    pub fn find(&self, name: &str) -> Result<&Particle, ParticleError> {
        self.particles
            .get(name)
            .ok_or_else(|| ParticleError::NotFound {
                query: name.to_string(),
                candidates: self.fuzzy_candidates(name),
            })
    }

    /// Looks a particle up by pid.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::PidNotFound`] if no member carries the pid.
    pub fn find_by_pid(&self, pid: i32) -> Result<&Particle, ParticleError> {
        self.particles
            .values()
            .find(|p| p.pid() == pid)
            .ok_or(ParticleError::PidNotFound(pid))
    }

    /// The members whose name comes closest to `query`, for error payloads.
    ///
    /// Matching is case-insensitive, first by substring, then by stripped
    /// family name ([`name_root`]).
    fn fuzzy_candidates(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        let substring_matches: Vec<String> = self
            .particles
            .keys()
            .filter(|name| name.to_lowercase().contains(&lowered))
            .cloned()
            .collect();
        if !substring_matches.is_empty() {
            return substring_matches;
        }
        let query_root = name_root(query).to_lowercase();
        if query_root.is_empty() {
            return Vec::new();
        }
        self.particles
            .keys()
            .filter(|name| name_root(name).to_lowercase() == query_root)
            .cloned()
            .collect()
    }

    /// The sub-collection of members satisfying `predicate`.
    pub fn filter(&self, predicate: impl Fn(&Particle) -> bool) -> ParticleCollection {
        ParticleCollection {
            particles: self
                .particles
                .iter()
                .filter(|(_, p)| predicate(p))
                .map(|(name, p)| (name.clone(), p.clone()))
                .collect(),
        }
    }

    /// The members of `self` that are not members of `other` (by name).
    pub fn difference(&self, other: &ParticleCollection) -> ParticleCollection {
        ParticleCollection {
            particles: self
                .particles
                .iter()
                .filter(|(name, _)| !other.particles.contains_key(*name))
                .map(|(name, p)| (name.clone(), p.clone()))
                .collect(),
        }
    }
}

impl FromIterator<Particle> for ParticleCollection {
    /// Collects particles, keeping the first entry on a conflict.
    ///
    /// `collect` cannot propagate an error, so every particle rejected by
    /// [`ParticleCollection::add`] is logged as a warning rather than
    /// discarded silently. Use [`ParticleCollection::extend`] to fail on
    /// conflicts instead.
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        let mut collection = ParticleCollection::new();
        for particle in iter {
            if let Err(error) = collection.add(particle) {
                warn!(%error, "particle discarded while collecting");
            }
        }
        collection
    }
}

impl<'a> IntoIterator for &'a ParticleCollection {
    type Item = &'a Particle;
    type IntoIter = std::collections::btree_map::Values<'a, String, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.values()
    }
}
