//! The complete quantum-number search workflow.
//!
//! [`run`] takes a [`SearchConfig`] and a particle database and returns every
//! reaction graph that satisfies the conservation rules: all isobar
//! topologies, all distributions of the external states, all intermediate
//! species and vertex couplings.
//!
//! All solutions are reported in a normalized edge numbering: within one
//! topology every solution assigns the same external particle to the same
//! edge id, so graphs differ only in their internal structure, the edge
//! origins of identical particles, and the assigned quantum numbers.

use crate::core::particle::{Particle, ParticleCollection, ParticleWithSpin};
use crate::core::topology::generator::generate_isobar_topologies;
use crate::core::topology::graph::{EdgeId, NodeId, StateTransitionGraph, Topology};
use crate::engine::combinatorics::{
    create_initial_facts, identical_particle_origin_permutations, resolve_spin_projections,
    InitialFacts, StateWithProjections,
};
use crate::engine::config::{InteractionSettings, SearchConfig};
use crate::engine::error::EngineError;
use crate::engine::solving::{self, SearchUnit};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The outcome of a search: all allowed reaction graphs, deduplicated and in
/// a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    solutions: Vec<StateTransitionGraph<ParticleWithSpin>>,
}

impl SearchResult {
    pub fn solutions(&self) -> &[StateTransitionGraph<ParticleWithSpin>] {
        &self.solutions
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// The names of all species appearing on intermediate edges.
    pub fn intermediate_particle_names(&self) -> BTreeSet<String> {
        self.solutions
            .iter()
            .flat_map(|graph| {
                graph
                    .topology()
                    .intermediate_edge_ids()
                    .into_iter()
                    .filter_map(|id| graph.edge_props(id))
                    .map(|(particle, _)| particle.name().to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Runs a full search.
///
/// # Errors
///
/// Fails if an external state cannot be resolved against the database, if
/// the reaction shape admits no isobar topology, or if the state counts do
/// not match the generated topologies.
#[instrument(skip_all, name = "search_workflow")]
pub fn run(
    config: &SearchConfig,
    particles: &ParticleCollection,
) -> Result<SearchResult, EngineError> {
    info!("Resolving external states against the particle database.");
    let initial: Vec<StateWithProjections> = config
        .initial_state()
        .iter()
        .map(|state| resolve_spin_projections(state, particles))
        .collect::<Result<_, _>>()?;
    let final_states: Vec<StateWithProjections> = config
        .final_state()
        .iter()
        .map(|state| resolve_spin_projections(state, particles))
        .collect::<Result<_, _>>()?;

    let topologies = generate_isobar_topologies(initial.len(), final_states.len())?;
    info!(count = topologies.len(), "Generated isobar topologies.");

    let candidates = intermediate_candidates(config, particles);
    let settings_per_type = config.interaction_settings();

    let mut units: Vec<SearchUnit> = Vec::new();
    for topology in &topologies {
        let facts = create_initial_facts(
            topology,
            &initial,
            &final_states,
            config.final_state_groupings(),
        )?;
        for (topology, initial_facts) in normalize_facts(topology, facts) {
            for node_settings in interaction_assignments(&topology, &settings_per_type) {
                units.push(SearchUnit {
                    topology: topology.clone(),
                    initial_facts: initial_facts.clone(),
                    node_settings,
                    candidates: candidates.clone(),
                });
            }
        }
    }
    info!(
        num_units = units.len(),
        num_candidates = candidates.len(),
        "Assembled search units."
    );

    #[cfg(feature = "parallel")]
    let iterator = units.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iterator = units.iter();
    let solved: Vec<StateTransitionGraph<ParticleWithSpin>> =
        iterator.flat_map(solving::solve).collect();

    // reintroduce the exchange degree of freedom of identical final-state
    // particles, deduplicating through the ordered set
    let mut unique = BTreeSet::new();
    for graph in solved {
        let particle_by_edge: BTreeMap<EdgeId, Particle> = graph
            .topology()
            .outgoing_edge_ids()
            .into_iter()
            .filter_map(|id| graph.edge_props(id).map(|(p, _)| (id, p.clone())))
            .collect();
        for origins in identical_particle_origin_permutations(graph.topology(), &particle_by_edge)
        {
            unique.insert(graph.with_edge_origins(&origins));
        }
    }
    info!(num_solutions = unique.len(), "Search complete.");
    Ok(SearchResult {
        solutions: unique.into_iter().collect(),
    })
}

/// The species and spin projections an intermediate edge may carry.
fn intermediate_candidates(
    config: &SearchConfig,
    particles: &ParticleCollection,
) -> Vec<ParticleWithSpin> {
    let patterns = config.allowed_intermediate_particles();
    particles
        .iter()
        .filter(|particle| {
            patterns.is_empty()
                || patterns
                    .iter()
                    .any(|pattern| particle.name().contains(pattern.as_str()))
        })
        .flat_map(|particle| {
            particle
                .allowed_spin_projections()
                .into_iter()
                .map(|projection| (particle.clone(), projection))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Relabels each seeding so that all of them place the same external
/// particle on the same edge id.
///
/// The first seeding serves as the reference. For every other one, outer
/// edges are matched greedily (lowest ids first) against the reference by
/// particle, and both the topology and the fact keys are relabeled with the
/// resulting permutation. The kinematic differences between seedings then
/// live entirely in the edge origins.
fn normalize_facts(
    topology: &Topology,
    facts: Vec<InitialFacts>,
) -> Vec<(Topology, InitialFacts)> {
    let Some(reference) = facts.first().cloned() else {
        return Vec::new();
    };
    facts
        .into_iter()
        .map(|fact| {
            let mut mapping: BTreeMap<EdgeId, EdgeId> = BTreeMap::new();
            let mut used: BTreeSet<EdgeId> = BTreeSet::new();
            for (&target_id, (wanted, _)) in &reference {
                let matched = fact
                    .iter()
                    .find(|(id, (particle, _))| !used.contains(*id) && particle == wanted)
                    .map(|(&id, _)| id);
                if let Some(source_id) = matched {
                    used.insert(source_id);
                    mapping.insert(source_id, target_id);
                }
            }
            let relabeled_topology = topology.relabel_edges(&mapping);
            let relabeled_fact: InitialFacts = fact
                .into_iter()
                .map(|(id, state)| (*mapping.get(&id).unwrap_or(&id), state))
                .collect();
            (relabeled_topology, relabeled_fact)
        })
        .collect()
}

/// Every way of assigning one interaction type to each vertex.
fn interaction_assignments(
    topology: &Topology,
    settings_per_type: &[InteractionSettings],
) -> Vec<BTreeMap<NodeId, InteractionSettings>> {
    let node_ids: Vec<NodeId> = topology.nodes().iter().copied().collect();
    node_ids
        .iter()
        .map(|_| settings_per_type.iter())
        .multi_cartesian_product()
        .map(|combo| {
            node_ids
                .iter()
                .zip(combo)
                .map(|(&node_id, settings)| (node_id, settings.clone()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Particle;
    use crate::core::quantum::{whole, InteractionType, Parity, Spin};
    use crate::engine::config::StateDefinition;

    fn charmonium_database() -> ParticleCollection {
        let isosinglet = Spin::new(whole(0), whole(0)).unwrap();
        let particles = [
            Particle::builder("J/psi(1S)", 443)
                .mass(3.096_9)
                .spin(whole(1))
                .isospin(isosinglet)
                .parity(Parity::Negative)
                .c_parity(Parity::Negative)
                .g_parity(Parity::Negative)
                .build()
                .unwrap(),
            Particle::builder("gamma", 22)
                .spin(whole(1))
                .parity(Parity::Negative)
                .c_parity(Parity::Negative)
                .build()
                .unwrap(),
            Particle::builder("pi0", 111)
                .mass(0.134_976_8)
                .spin(whole(0))
                .isospin(Spin::new(whole(1), whole(0)).unwrap())
                .parity(Parity::Negative)
                .c_parity(Parity::Positive)
                .g_parity(Parity::Negative)
                .build()
                .unwrap(),
            Particle::builder("f(0)(980)", 9010221)
                .mass(0.99)
                .width(0.06)
                .spin(whole(0))
                .isospin(isosinglet)
                .parity(Parity::Positive)
                .c_parity(Parity::Positive)
                .g_parity(Parity::Positive)
                .build()
                .unwrap(),
            Particle::builder("f(2)(1270)", 225)
                .mass(1.275_5)
                .width(0.186_7)
                .spin(whole(2))
                .isospin(isosinglet)
                .parity(Parity::Positive)
                .c_parity(Parity::Positive)
                .g_parity(Parity::Positive)
                .build()
                .unwrap(),
            Particle::builder("omega(782)", 223)
                .mass(0.782_66)
                .width(0.008_68)
                .spin(whole(1))
                .isospin(isosinglet)
                .parity(Parity::Negative)
                .c_parity(Parity::Negative)
                .g_parity(Parity::Negative)
                .build()
                .unwrap(),
        ];
        particles.into_iter().collect()
    }

    fn jpsi_config() -> SearchConfig {
        SearchConfig::builder()
            .initial_state(vec![StateDefinition::with_projections(
                "J/psi(1S)",
                vec![whole(-1), whole(1)],
            )])
            .final_state_names(&["gamma", "pi0", "pi0"])
            .allowed_interaction_types(vec![InteractionType::Strong, InteractionType::EM])
            .allowed_intermediate_particles(&["f(0)", "f(2)", "omega"])
            .build()
            .unwrap()
    }

    #[test]
    fn radiative_charmonium_decay_finds_the_known_intermediates() {
        let result = run(&jpsi_config(), &charmonium_database()).unwrap();
        assert!(!result.is_empty());

        let names = result.intermediate_particle_names();
        assert!(names.contains("f(0)(980)"), "names: {names:?}");
        assert!(names.contains("f(2)(1270)"), "names: {names:?}");
        // omega only reaches the gamma pi0 subsystem through an EM vertex
        assert!(names.contains("omega(782)"), "names: {names:?}");
    }

    #[test]
    fn all_solutions_share_the_external_edge_assignment() {
        let result = run(&jpsi_config(), &charmonium_database()).unwrap();
        for graph in result.solutions() {
            assert_eq!(graph.edge_props(0).unwrap().0.name(), "J/psi(1S)");
            assert_eq!(graph.edge_props(2).unwrap().0.name(), "gamma");
            assert_eq!(graph.edge_props(3).unwrap().0.name(), "pi0");
            assert_eq!(graph.edge_props(4).unwrap().0.name(), "pi0");
        }
    }

    #[test]
    fn solutions_are_complete_graphs() {
        let result = run(&jpsi_config(), &charmonium_database()).unwrap();
        for graph in result.solutions() {
            for node_id in graph.topology().nodes().iter().copied() {
                let vertex = graph.node_props(node_id).unwrap();
                assert!(vertex.l_magnitude >= whole(0));
            }
            for edge_id in graph.topology().edges().keys().copied() {
                assert!(graph.edge_props(edge_id).is_some());
            }
        }
    }

    #[test]
    fn grouping_filter_excludes_subsystems() {
        // omega cannot decay into pi0 pi0, so restricting the search to the
        // two-pion subsystem leaves no omega solutions
        let config = SearchConfig::builder()
            .initial_state_names(&["J/psi(1S)"])
            .final_state_names(&["gamma", "pi0", "pi0"])
            .allowed_interaction_types(vec![InteractionType::Strong, InteractionType::EM])
            .allowed_intermediate_particles(&["omega"])
            .final_state_groupings(vec![vec!["pi0".to_string(), "pi0".to_string()]])
            .build()
            .unwrap();
        let result = run(&config, &charmonium_database()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn unknown_external_state_reports_suggestions() {
        let config = SearchConfig::builder()
            .initial_state_names(&["J/psi"])
            .final_state_names(&["gamma", "pi0", "pi0"])
            .build()
            .unwrap();
        let error = run(&config, &charmonium_database()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("J/psi(1S)"), "message: {message}");
    }

    #[test]
    fn identical_particles_expand_to_exchanged_attachments() {
        let result = run(&jpsi_config(), &charmonium_database()).unwrap();
        // for any solution with the two pions at different vertices, the
        // exchanged attachment must also be present
        let omega_solutions: Vec<_> = result
            .solutions()
            .iter()
            .filter(|graph| {
                graph
                    .edge_props(1)
                    .is_some_and(|(p, _)| p.name() == "omega(782)")
            })
            .collect();
        assert!(!omega_solutions.is_empty());
        let mut saw_split_attachment = false;
        for graph in &omega_solutions {
            let origin_3 = graph.topology().edge(3).unwrap().originating_node.unwrap();
            let origin_4 = graph.topology().edge(4).unwrap().originating_node.unwrap();
            if origin_3 != origin_4 {
                saw_split_attachment = true;
                let exchanged = result.solutions().iter().any(|other| {
                    other.topology().edge(3).unwrap().originating_node == Some(origin_4)
                        && other.topology().edge(4).unwrap().originating_node == Some(origin_3)
                        && other.edge_props(1) == graph.edge_props(1)
                });
                assert!(exchanged);
            }
        }
        // omega lives in the gamma pi0 subsystem, so the pions sit at
        // different vertices there
        assert!(saw_split_attachment);
    }
}
