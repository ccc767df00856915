//! Seeding of the search: distributing the external particles over the outer
//! edges of a topology.
//!
//! Two assignments that merely swap identical particles between equivalent
//! positions describe the same kinematics, so the stage deduplicates by a
//! [`KinematicRepresentation`] of each assignment. The identical-particle
//! exchange degree of freedom is reintroduced at the end of a search by
//! [`identical_particle_origin_permutations`], which enumerates the distinct
//! ways of attaching identical final-state particles to their vertices.

use crate::core::particle::{Particle, ParticleError, ParticleWithSpin, ParticleCollection};
use crate::core::quantum::{Spin, SpinError};
use crate::core::topology::graph::{EdgeId, NodeId, Topology};
use crate::engine::config::StateDefinition;
use itertools::Itertools;
use num_rational::Ratio;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// A resolved external state: the particle plus the spin projections it may
/// take on its edge.
pub type StateWithProjections = (Particle, Vec<Ratio<i32>>);

/// One complete assignment of external states to outer edges, the seed of a
/// constraint problem.
pub type InitialFacts = BTreeMap<EdgeId, ParticleWithSpin>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombinatoricsError {
    #[error("the topology has {expected} {role} state edges but {got} {role} states were given")]
    StateCountMismatch {
        role: &'static str,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Particle(#[from] ParticleError),

    #[error(transparent)]
    Spin(#[from] SpinError),
}

/// Resolves a configured state against the particle database and determines
/// the spin projections it may carry. Explicitly requested projections are
/// returned in ascending order, without duplicates.
///
/// # Errors
///
/// Fails if the name is unknown (with fuzzy-matched suggestions) or if an
/// explicitly requested projection is not a valid projection of the
/// particle's spin.
pub fn resolve_spin_projections(
    state: &StateDefinition,
    particles: &ParticleCollection,
) -> Result<StateWithProjections, CombinatoricsError> {
    let particle = particles.find(&state.name)?;
    let projections = match &state.spin_projections {
        Some(projections) => {
            for &projection in projections {
                Spin::new(particle.spin(), projection)?;
            }
            let mut projections = projections.clone();
            projections.sort();
            projections.dedup();
            projections
        }
        None => particle.allowed_spin_projections(),
    };
    Ok((particle.clone(), projections))
}

/// How an assignment of particles to outer edges looks kinematically: per
/// vertex, the (sorted) initial-state content flowing into it and the
/// final-state content its subtree decays into. The per-vertex groups are
/// themselves kept sorted, so relabeling the vertices of a symmetric
/// topology does not change the representation.
///
/// Assignments with equal representations are indistinguishable in any
/// observable and are collapsed to one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KinematicRepresentation {
    initial_state: Vec<Vec<String>>,
    final_state: Vec<Vec<String>>,
}

impl KinematicRepresentation {
    pub fn new(topology: &Topology, names: &BTreeMap<EdgeId, String>) -> Self {
        let collect = |edge_ids: Vec<EdgeId>| -> Vec<String> {
            let mut group: Vec<String> = edge_ids
                .iter()
                .filter_map(|id| names.get(id).cloned())
                .collect();
            group.sort();
            group
        };
        let mut initial_state: Vec<Vec<String>> = topology
            .nodes()
            .iter()
            .map(|&node| collect(topology.originating_initial_state_edge_ids(node)))
            .collect();
        initial_state.sort();
        let mut final_state: Vec<Vec<String>> = topology
            .nodes()
            .iter()
            .map(|&node| collect(topology.originating_final_state_edge_ids(node)))
            .collect();
        final_state.sort();
        Self {
            initial_state,
            final_state,
        }
    }

    /// Whether some subsystem of this assignment consists of exactly the
    /// given particles, in any order.
    pub fn contains_final_state_grouping(&self, grouping: &[String]) -> bool {
        let mut sorted = grouping.to_vec();
        sorted.sort();
        self.final_state.iter().any(|group| *group == sorted)
    }
}

/// Every raw bijection of the external states onto the outer edges of
/// `topology`: `n_final! * n_initial!` assignments, before any
/// deduplication.
pub fn generate_outer_edge_permutations(
    topology: &Topology,
    initial: &[StateWithProjections],
    final_states: &[StateWithProjections],
) -> Result<Vec<BTreeMap<EdgeId, StateWithProjections>>, CombinatoricsError> {
    let incoming_ids = topology.incoming_edge_ids();
    let outgoing_ids = topology.outgoing_edge_ids();
    if incoming_ids.len() != initial.len() {
        return Err(CombinatoricsError::StateCountMismatch {
            role: "initial",
            expected: incoming_ids.len(),
            got: initial.len(),
        });
    }
    if outgoing_ids.len() != final_states.len() {
        return Err(CombinatoricsError::StateCountMismatch {
            role: "final",
            expected: outgoing_ids.len(),
            got: final_states.len(),
        });
    }

    let mut result = Vec::new();
    for initial_perm in initial.iter().permutations(initial.len()) {
        for final_perm in final_states.iter().permutations(final_states.len()) {
            let assignment: BTreeMap<EdgeId, StateWithProjections> = incoming_ids
                .iter()
                .zip(&initial_perm)
                .chain(outgoing_ids.iter().zip(&final_perm))
                .map(|(&id, &state)| (id, state.clone()))
                .collect();
            result.push(assignment);
        }
    }
    Ok(result)
}

/// All kinematically distinct assignments of the external states to the
/// outer edges of `topology`.
///
/// When `groupings` is non-empty, only assignments in which one subsystem
/// collects one of the listed particle multisets survive.
pub fn generate_kinematic_permutations(
    topology: &Topology,
    initial: &[StateWithProjections],
    final_states: &[StateWithProjections],
    groupings: &[Vec<String>],
) -> Result<Vec<BTreeMap<EdgeId, StateWithProjections>>, CombinatoricsError> {
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();
    for assignment in generate_outer_edge_permutations(topology, initial, final_states)? {
        let names: BTreeMap<EdgeId, String> = assignment
            .iter()
            .map(|(&id, (particle, _))| (id, particle.name().to_string()))
            .collect();
        let representation = KinematicRepresentation::new(topology, &names);
        if !groupings.is_empty()
            && !groupings
                .iter()
                .any(|g| representation.contains_final_state_grouping(g))
        {
            continue;
        }
        if seen.insert(representation) {
            result.push(assignment);
        }
    }
    debug!(count = result.len(), "kinematic permutations");
    Ok(result)
}

/// Expands one kinematic assignment into all spin-projection combinations.
///
/// Edges are enumerated in ascending id order and projections in the order
/// the assignment lists them, with later edges varying fastest.
pub fn generate_spin_permutations(
    assignment: &BTreeMap<EdgeId, StateWithProjections>,
) -> Vec<InitialFacts> {
    assignment
        .iter()
        .map(|(&id, (particle, projections))| {
            projections
                .iter()
                .map(|&projection| (id, (particle.clone(), projection)))
                .collect::<Vec<_>>()
        })
        .multi_cartesian_product()
        .map(|facts| facts.into_iter().collect())
        .collect()
}

/// The full seeding stage for one topology: kinematic permutations times
/// spin permutations.
pub fn create_initial_facts(
    topology: &Topology,
    initial: &[StateWithProjections],
    final_states: &[StateWithProjections],
    groupings: &[Vec<String>],
) -> Result<Vec<InitialFacts>, CombinatoricsError> {
    let facts: Vec<InitialFacts> =
        generate_kinematic_permutations(topology, initial, final_states, groupings)?
            .iter()
            .flat_map(generate_spin_permutations)
            .collect();
    debug!(count = facts.len(), "initial facts");
    Ok(facts)
}

/// The distinct ways of re-attaching identical final-state particles to
/// their originating vertices.
///
/// Identical particles are grouped by quantum numbers; within each group the
/// originating vertices are permuted in every distinguishable way. Each
/// returned map sends the group's edge ids (ascending) to their new origins;
/// the first entry is always the identity. Groups are processed in order of
/// their lowest edge id, later groups varying fastest.
pub fn identical_particle_origin_permutations(
    topology: &Topology,
    particle_by_edge: &BTreeMap<EdgeId, Particle>,
) -> Vec<BTreeMap<EdgeId, NodeId>> {
    let mut groups: Vec<(Particle, Vec<EdgeId>)> = Vec::new();
    for edge_id in topology.outgoing_edge_ids() {
        let Some(particle) = particle_by_edge.get(&edge_id) else {
            continue;
        };
        match groups.iter_mut().find(|(p, _)| p == particle) {
            Some((_, edge_ids)) => edge_ids.push(edge_id),
            None => groups.push((particle.clone(), vec![edge_id])),
        }
    }

    let per_group: Vec<Vec<BTreeMap<EdgeId, NodeId>>> = groups
        .iter()
        .filter(|(_, edge_ids)| edge_ids.len() > 1)
        .map(|(_, edge_ids)| {
            let origins: Vec<NodeId> = edge_ids
                .iter()
                .filter_map(|id| topology.edge(*id).and_then(|e| e.originating_node))
                .collect();
            let unique: BTreeSet<Vec<NodeId>> = origins
                .iter()
                .copied()
                .permutations(origins.len())
                .collect();
            unique
                .into_iter()
                .map(|permuted| edge_ids.iter().copied().zip(permuted).collect())
                .collect()
        })
        .collect();

    if per_group.is_empty() {
        return vec![BTreeMap::new()];
    }
    per_group
        .into_iter()
        .multi_cartesian_product()
        .map(|combo| combo.into_iter().flatten().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quantum::{whole, Parity, Spin};
    use crate::core::topology::generator::generate_isobar_topologies;

    fn jpsi() -> Particle {
        Particle::builder("J/psi(1S)", 443)
            .mass(3.096_9)
            .spin(whole(1))
            .c_parity(Parity::Negative)
            .parity(Parity::Negative)
            .build()
            .unwrap()
    }

    fn gamma() -> Particle {
        Particle::builder("gamma", 22)
            .spin(whole(1))
            .c_parity(Parity::Negative)
            .parity(Parity::Negative)
            .build()
            .unwrap()
    }

    fn pi0() -> Particle {
        Particle::builder("pi0", 111)
            .mass(0.134_976_8)
            .spin(whole(0))
            .isospin(Spin::new(whole(1), whole(0)).unwrap())
            .parity(Parity::Negative)
            .c_parity(Parity::Positive)
            .build()
            .unwrap()
    }

    fn three_body() -> Topology {
        generate_isobar_topologies(1, 3).unwrap().remove(0)
    }

    fn jpsi_to_gamma_pi0_pi0() -> (Vec<StateWithProjections>, Vec<StateWithProjections>) {
        let initial = vec![(jpsi(), vec![whole(-1), whole(1)])];
        let final_states = vec![
            (gamma(), vec![whole(-1), whole(1)]),
            (pi0(), vec![whole(0)]),
            (pi0(), vec![whole(0)]),
        ];
        (initial, final_states)
    }

    #[test]
    fn outer_edge_permutations_are_exhaustive_for_distinguishable_particles() {
        let initial = vec![(jpsi(), vec![whole(0)])];
        let final_states = vec![
            (gamma(), vec![whole(1)]),
            (pi0(), vec![whole(0)]),
            (jpsi(), vec![whole(0)]),
        ];
        let raw =
            generate_outer_edge_permutations(&three_body(), &initial, &final_states).unwrap();
        assert_eq!(raw.len(), 6);
        // three distinct two-body subsystems survive deduplication
        let deduplicated =
            generate_kinematic_permutations(&three_body(), &initial, &final_states, &[]).unwrap();
        assert_eq!(deduplicated.len(), 3);
    }

    #[test]
    fn kinematic_permutations_ignore_vertex_labels_in_symmetric_topologies() {
        // double decay: the two two-body subsystems are interchangeable, so
        // four distinct scalars give the 3 pair partitions, not 6
        let topology = generate_isobar_topologies(1, 4)
            .unwrap()
            .into_iter()
            .find(|t| {
                t.edges_from(0).len() == 2
                    && t.edges_from(0)
                        .iter()
                        .all(|id| t.edge(*id).unwrap().is_intermediate())
            })
            .unwrap();
        let scalar = |name: &str, pid: i32, mass: f64| {
            (
                Particle::builder(name, pid)
                    .mass(mass)
                    .spin(whole(0))
                    .build()
                    .unwrap(),
                vec![whole(0)],
            )
        };
        let initial = vec![(jpsi(), vec![whole(0)])];
        let final_states = vec![
            scalar("a", 1, 0.1),
            scalar("b", 2, 0.2),
            scalar("c", 3, 0.3),
            scalar("d", 4, 0.4),
        ];
        let permutations =
            generate_kinematic_permutations(&topology, &initial, &final_states, &[]).unwrap();
        assert_eq!(permutations.len(), 3);

        // "a" is paired with a different partner in every survivor
        let partners: BTreeSet<&str> = permutations
            .iter()
            .map(|assignment| {
                let pair = if assignment[&3].0.name() == "a" || assignment[&4].0.name() == "a" {
                    [3, 4]
                } else {
                    [5, 6]
                };
                pair.iter()
                    .map(|id| assignment[id].0.name())
                    .find(|name| *name != "a")
                    .unwrap()
            })
            .collect();
        assert_eq!(partners, BTreeSet::from(["b", "c", "d"]));
    }

    #[test]
    fn kinematic_permutations_collapse_identical_particles() {
        let (initial, final_states) = jpsi_to_gamma_pi0_pi0();
        let permutations =
            generate_kinematic_permutations(&three_body(), &initial, &final_states, &[]).unwrap();
        // gamma recoiling against the pi0 pair, or paired with one pi0
        assert_eq!(permutations.len(), 2);
        assert_eq!(permutations[0][&2].0.name(), "gamma");
        assert_eq!(permutations[1][&2].0.name(), "pi0");
    }

    #[test]
    fn grouping_filter_keeps_matching_subsystems_only() {
        let (initial, final_states) = jpsi_to_gamma_pi0_pi0();
        let groupings = vec![vec!["pi0".to_string(), "pi0".to_string()]];
        let permutations =
            generate_kinematic_permutations(&three_body(), &initial, &final_states, &groupings)
                .unwrap();
        assert_eq!(permutations.len(), 1);
        assert_eq!(permutations[0][&2].0.name(), "gamma");
        assert_eq!(permutations[0][&3].0.name(), "pi0");
        assert_eq!(permutations[0][&4].0.name(), "pi0");
    }

    #[test]
    fn state_count_mismatch_is_an_error() {
        let (initial, _) = jpsi_to_gamma_pi0_pi0();
        let too_few = vec![(gamma(), vec![whole(1)])];
        assert!(matches!(
            generate_kinematic_permutations(&three_body(), &initial, &too_few, &[]),
            Err(CombinatoricsError::StateCountMismatch {
                role: "final",
                expected: 3,
                got: 1,
            })
        ));
    }

    #[test]
    fn initial_facts_enumerate_spin_projections_in_order() {
        let (initial, final_states) = jpsi_to_gamma_pi0_pi0();
        let groupings = vec![vec!["pi0".to_string(), "pi0".to_string()]];
        let facts =
            create_initial_facts(&three_body(), &initial, &final_states, &groupings).unwrap();
        // one kinematic permutation, 2 x 2 spin combinations
        assert_eq!(facts.len(), 4);

        // edges ascending, later edges varying fastest
        assert_eq!(facts[0][&0].1, whole(-1));
        assert_eq!(facts[0][&2].1, whole(-1));
        assert_eq!(facts[1][&0].1, whole(-1));
        assert_eq!(facts[1][&2].1, whole(1));
        assert_eq!(facts[2][&0].1, whole(1));
        for fact in &facts {
            assert_eq!(fact[&3].1, whole(0));
            assert_eq!(fact[&4].1, whole(0));
        }
    }

    #[test]
    fn resolve_spin_projections_validates_requested_projections() {
        let mut collection = ParticleCollection::new();
        collection.add(gamma()).unwrap();

        let valid = StateDefinition::with_projections("gamma", vec![whole(-1), whole(1)]);
        let (particle, projections) =
            resolve_spin_projections(&valid, &collection).unwrap();
        assert_eq!(particle.name(), "gamma");
        assert_eq!(projections, vec![whole(-1), whole(1)]);

        let invalid = StateDefinition::with_projections("gamma", vec![whole(2)]);
        assert!(matches!(
            resolve_spin_projections(&invalid, &collection),
            Err(CombinatoricsError::Spin(
                SpinError::ProjectionExceedsMagnitude { .. }
            ))
        ));

        let unknown = StateDefinition::new("gamm");
        assert!(matches!(
            resolve_spin_projections(&unknown, &collection),
            Err(CombinatoricsError::Particle(ParticleError::NotFound { .. }))
        ));
    }

    #[test]
    fn resolve_spin_projections_sorts_requested_projections() {
        let mut collection = ParticleCollection::new();
        collection.add(gamma()).unwrap();

        let unordered = StateDefinition::with_projections(
            "gamma",
            vec![whole(1), whole(-1), whole(1)],
        );
        let (_, projections) = resolve_spin_projections(&unordered, &collection).unwrap();
        assert_eq!(projections, vec![whole(-1), whole(1)]);
    }

    #[test]
    fn origin_permutations_for_two_identical_pairs() {
        // double decay: edges 3, 4 at node 1 and edges 5, 6 at node 2
        let topology = generate_isobar_topologies(1, 4)
            .unwrap()
            .into_iter()
            .find(|t| {
                t.edges_from(0).len() == 2
                    && t.edges_from(0)
                        .iter()
                        .all(|id| t.edge(*id).unwrap().is_intermediate())
            })
            .unwrap();
        // pair A on edges 3 and 5, pair B on edges 4 and 6
        let assignment = BTreeMap::from([
            (3, pi0()),
            (4, gamma()),
            (5, pi0()),
            (6, gamma()),
        ]);
        let variants = identical_particle_origin_permutations(&topology, &assignment);

        let patterns: Vec<Vec<NodeId>> = variants
            .iter()
            .map(|origins| {
                [3, 4, 5, 6]
                    .iter()
                    .map(|id| {
                        origins
                            .get(id)
                            .copied()
                            .unwrap_or_else(|| topology.edge(*id).unwrap().originating_node.unwrap())
                    })
                    .collect()
            })
            .collect();
        assert_eq!(
            patterns,
            vec![
                vec![1, 1, 2, 2],
                vec![1, 2, 2, 1],
                vec![2, 1, 1, 2],
                vec![2, 2, 1, 1],
            ]
        );
    }

    #[test]
    fn origin_permutations_without_identical_particles_are_trivial() {
        let topology = three_body();
        let assignment = BTreeMap::from([(2, gamma()), (3, pi0()), (4, jpsi())]);
        let variants = identical_particle_origin_permutations(&topology, &assignment);
        assert_eq!(variants, vec![BTreeMap::new()]);
    }

    #[test]
    fn origin_permutations_for_a_pair_split_across_nodes() {
        let topology = three_body();
        // gamma with one pi0 at node 0, the other pi0 at node 1
        let assignment = BTreeMap::from([(2, pi0()), (3, gamma()), (4, pi0())]);
        let variants = identical_particle_origin_permutations(&topology, &assignment);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0], BTreeMap::from([(2, 0), (4, 1)]));
        assert_eq!(variants[1], BTreeMap::from([(2, 1), (4, 0)]));
    }
}
