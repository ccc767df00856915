//! Configuration of a quantum-number search.
//!
//! A [`SearchConfig`] names the initial and final state, restricts the
//! interaction types and intermediate species that may appear, and bounds the
//! coupling quantum numbers tried at each vertex. Configurations are built
//! through [`SearchConfigBuilder`], which validates required parameters.

use crate::core::quantum::{halves, whole, InteractionType};
use crate::engine::rules::{rule_set, ConservationRule};
use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration parameter: {0}")]
    MissingParameter(&'static str),

    #[error("The {0} state needs at least one particle")]
    EmptyState(&'static str),
}

/// One external particle of the reaction, optionally restricted to a subset
/// of its spin projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    pub spin_projections: Option<Vec<Ratio<i32>>>,
}

impl StateDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            spin_projections: None,
        }
    }

    pub fn with_projections(name: &str, spin_projections: Vec<Ratio<i32>>) -> Self {
        Self {
            name: name.to_string(),
            spin_projections: Some(spin_projections),
        }
    }
}

impl From<&str> for StateDefinition {
    fn from(name: &str) -> Self {
        StateDefinition::new(name)
    }
}

/// The domains and rules applied at a vertex of one interaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionSettings {
    pub interaction: InteractionType,
    pub l_magnitudes: Vec<Ratio<i32>>,
    pub s_magnitudes: Vec<Ratio<i32>>,
    pub rules: Vec<ConservationRule>,
}

impl InteractionSettings {
    /// The default settings for an interaction type: integer `l` up to
    /// `max_l`, half-integer-stepped `s` up to `max_s`, and the conservation
    /// rules the interaction respects.
    pub fn for_interaction(
        interaction: InteractionType,
        max_l: i32,
        max_s: Ratio<i32>,
    ) -> Self {
        let l_magnitudes = (0..=max_l).map(whole).collect();
        let mut s_magnitudes = Vec::new();
        let mut s = whole(0);
        while s <= max_s {
            s_magnitudes.push(s);
            s += halves(1);
        }
        Self {
            interaction,
            l_magnitudes,
            s_magnitudes,
            rules: rule_set(interaction),
        }
    }
}

/// A complete description of one search over a reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    initial_state: Vec<StateDefinition>,
    final_state: Vec<StateDefinition>,
    allowed_interaction_types: Vec<InteractionType>,
    allowed_intermediate_particles: Vec<String>,
    final_state_groupings: Vec<Vec<String>>,
    max_angular_momentum: i32,
    max_spin_magnitude: Ratio<i32>,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    pub fn initial_state(&self) -> &[StateDefinition] {
        &self.initial_state
    }

    pub fn final_state(&self) -> &[StateDefinition] {
        &self.final_state
    }

    pub fn allowed_interaction_types(&self) -> &[InteractionType] {
        &self.allowed_interaction_types
    }

    /// Name patterns for allowed intermediate species; empty means no
    /// restriction. A pattern matches a particle whose name contains it.
    pub fn allowed_intermediate_particles(&self) -> &[String] {
        &self.allowed_intermediate_particles
    }

    /// Required final-state groupings; a kinematic permutation survives only
    /// if one of its subsystems collects exactly one of these particle
    /// multisets. Empty means no filter.
    pub fn final_state_groupings(&self) -> &[Vec<String>] {
        &self.final_state_groupings
    }

    pub fn max_angular_momentum(&self) -> i32 {
        self.max_angular_momentum
    }

    pub fn max_spin_magnitude(&self) -> Ratio<i32> {
        self.max_spin_magnitude
    }

    /// The per-vertex settings for every allowed interaction type, strongest
    /// first.
    pub fn interaction_settings(&self) -> Vec<InteractionSettings> {
        self.allowed_interaction_types
            .iter()
            .map(|&interaction| {
                InteractionSettings::for_interaction(
                    interaction,
                    self.max_angular_momentum,
                    self.max_spin_magnitude,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    initial_state: Option<Vec<StateDefinition>>,
    final_state: Option<Vec<StateDefinition>>,
    allowed_interaction_types: Option<Vec<InteractionType>>,
    allowed_intermediate_particles: Option<Vec<String>>,
    final_state_groupings: Option<Vec<Vec<String>>>,
    max_angular_momentum: Option<i32>,
    max_spin_magnitude: Option<Ratio<i32>>,
}

impl SearchConfigBuilder {
    pub fn initial_state(mut self, states: Vec<StateDefinition>) -> Self {
        self.initial_state = Some(states);
        self
    }

    pub fn final_state(mut self, states: Vec<StateDefinition>) -> Self {
        self.final_state = Some(states);
        self
    }

    /// Convenience for the common case of plain particle names.
    pub fn initial_state_names(self, names: &[&str]) -> Self {
        self.initial_state(names.iter().map(|&n| StateDefinition::new(n)).collect())
    }

    pub fn final_state_names(self, names: &[&str]) -> Self {
        self.final_state(names.iter().map(|&n| StateDefinition::new(n)).collect())
    }

    pub fn allowed_interaction_types(mut self, types: Vec<InteractionType>) -> Self {
        self.allowed_interaction_types = Some(types);
        self
    }

    pub fn allowed_intermediate_particles(mut self, patterns: &[&str]) -> Self {
        self.allowed_intermediate_particles =
            Some(patterns.iter().map(|&p| p.to_string()).collect());
        self
    }

    pub fn final_state_groupings(mut self, groupings: Vec<Vec<String>>) -> Self {
        self.final_state_groupings = Some(groupings);
        self
    }

    pub fn max_angular_momentum(mut self, max_l: i32) -> Self {
        self.max_angular_momentum = Some(max_l);
        self
    }

    pub fn max_spin_magnitude(mut self, max_s: Ratio<i32>) -> Self {
        self.max_spin_magnitude = Some(max_s);
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the initial or final state is missing or
    /// empty. Everything else has a default: all interaction types, no
    /// intermediate-species restriction, no grouping filter, `l` up to 2 and
    /// `s` up to 2.
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let initial_state = self
            .initial_state
            .ok_or(ConfigError::MissingParameter("initial_state"))?;
        let final_state = self
            .final_state
            .ok_or(ConfigError::MissingParameter("final_state"))?;
        if initial_state.is_empty() {
            return Err(ConfigError::EmptyState("initial"));
        }
        if final_state.is_empty() {
            return Err(ConfigError::EmptyState("final"));
        }
        Ok(SearchConfig {
            initial_state,
            final_state,
            allowed_interaction_types: self.allowed_interaction_types.unwrap_or_else(|| {
                vec![
                    InteractionType::Strong,
                    InteractionType::EM,
                    InteractionType::Weak,
                ]
            }),
            allowed_intermediate_particles: self.allowed_intermediate_particles.unwrap_or_default(),
            final_state_groupings: self.final_state_groupings.unwrap_or_default(),
            max_angular_momentum: self.max_angular_momentum.unwrap_or(2),
            max_spin_magnitude: self.max_spin_magnitude.unwrap_or_else(|| whole(2)),
        })
    }
}
