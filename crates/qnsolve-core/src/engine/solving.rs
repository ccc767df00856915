//! Translation of a seeded topology into a constraint problem and back.
//!
//! A [`SearchUnit`] fixes everything the combinatorics stage decided: the
//! topology, the external states with their spin projections, and the
//! interaction type assumed at each vertex. Solving assigns the open degrees
//! of freedom, one variable per intermediate edge (which particle and
//! projection it carries) and one per vertex (its `l` and `s` coupling), and
//! keeps the assignments on which every conservation rule holds.

use crate::core::particle::ParticleWithSpin;
use crate::core::topology::graph::{
    EdgeId, NodeId, NodeProps, StateTransitionGraph, Topology,
};
use crate::engine::combinatorics::InitialFacts;
use crate::engine::config::InteractionSettings;
use crate::engine::csp::{Problem, VariableId};
use crate::engine::rules::{EdgeQuantumNumbers, NodeQuantumNumbers};
use num_rational::Ratio;
use std::collections::BTreeMap;
use tracing::trace;

/// A value a constraint variable can take: either the state on an
/// intermediate edge or the coupling at a vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum CspValue {
    EdgeState(ParticleWithSpin),
    NodeCoupling {
        l_magnitude: Ratio<i32>,
        s_magnitude: Ratio<i32>,
    },
}

/// One fully specified constraint problem.
#[derive(Debug, Clone)]
pub struct SearchUnit {
    pub topology: Topology,
    pub initial_facts: InitialFacts,
    pub node_settings: BTreeMap<NodeId, InteractionSettings>,
    /// Domain of every intermediate edge.
    pub candidates: Vec<ParticleWithSpin>,
}

/// One slot of a vertex constraint: an external state fixed by the initial
/// facts, or a reference into the constraint scope.
#[derive(Clone)]
enum Slot {
    Fixed(EdgeQuantumNumbers),
    Variable(usize),
}

fn resolve_slots(slots: &[Slot], values: &[&CspValue]) -> Option<Vec<EdgeQuantumNumbers>> {
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Fixed(qns) => Some(qns.clone()),
            Slot::Variable(index) => match values.get(*index)? {
                CspValue::EdgeState((particle, projection)) => {
                    Some(EdgeQuantumNumbers::from_state(particle, *projection))
                }
                CspValue::NodeCoupling { .. } => None,
            },
        })
        .collect()
}

/// Solves one unit, returning every consistent assignment as a complete
/// state transition graph.
pub fn solve(unit: &SearchUnit) -> Vec<StateTransitionGraph<ParticleWithSpin>> {
    let mut problem: Problem<CspValue> = Problem::new();

    let mut edge_vars: BTreeMap<EdgeId, VariableId> = BTreeMap::new();
    for edge_id in unit.topology.intermediate_edge_ids() {
        let domain = unit
            .candidates
            .iter()
            .cloned()
            .map(CspValue::EdgeState)
            .collect();
        edge_vars.insert(edge_id, problem.add_variable(domain));
    }

    // node variables come last, so every vertex constraint is checked the
    // moment its node variable is assigned
    let mut node_vars: BTreeMap<NodeId, VariableId> = BTreeMap::new();
    for (&node_id, settings) in &unit.node_settings {
        let domain = settings
            .l_magnitudes
            .iter()
            .flat_map(|&l_magnitude| {
                settings
                    .s_magnitudes
                    .iter()
                    .map(move |&s_magnitude| CspValue::NodeCoupling {
                        l_magnitude,
                        s_magnitude,
                    })
            })
            .collect();
        node_vars.insert(node_id, problem.add_variable(domain));
    }

    for (&node_id, settings) in &unit.node_settings {
        let mut scope: Vec<VariableId> = Vec::new();
        let to_slot = |edge_id: EdgeId, scope: &mut Vec<VariableId>| -> Option<Slot> {
            if let Some((particle, projection)) = unit.initial_facts.get(&edge_id) {
                return Some(Slot::Fixed(EdgeQuantumNumbers::from_state(
                    particle,
                    *projection,
                )));
            }
            let variable = *edge_vars.get(&edge_id)?;
            scope.push(variable);
            Some(Slot::Variable(scope.len() - 1))
        };
        let incoming: Vec<Slot> = unit
            .topology
            .edges_to(node_id)
            .into_iter()
            .filter_map(|id| to_slot(id, &mut scope))
            .collect();
        let outgoing: Vec<Slot> = unit
            .topology
            .edges_from(node_id)
            .into_iter()
            .filter_map(|id| to_slot(id, &mut scope))
            .collect();

        let Some(&node_var) = node_vars.get(&node_id) else {
            continue;
        };
        let node_position = scope.len();
        scope.push(node_var);

        for &rule in &settings.rules {
            let incoming = incoming.clone();
            let outgoing = outgoing.clone();
            problem.add_constraint(scope.clone(), move |values| {
                let Some(&CspValue::NodeCoupling {
                    l_magnitude,
                    s_magnitude,
                }) = values.get(node_position).copied()
                else {
                    return false;
                };
                let node = NodeQuantumNumbers {
                    l_magnitude,
                    s_magnitude,
                };
                match (
                    resolve_slots(&incoming, values),
                    resolve_slots(&outgoing, values),
                ) {
                    (Some(incoming), Some(outgoing)) => rule.check(&incoming, &outgoing, &node),
                    _ => false,
                }
            });
        }
    }

    let assignments = problem.solve_all();
    trace!(count = assignments.len(), "consistent assignments for unit");

    assignments
        .into_iter()
        .filter_map(|values| {
            let mut edge_props = unit.initial_facts.clone();
            for (&edge_id, &variable) in &edge_vars {
                let CspValue::EdgeState(state) = &values[variable] else {
                    return None;
                };
                edge_props.insert(edge_id, state.clone());
            }
            let mut node_props = BTreeMap::new();
            for (&node_id, &variable) in &node_vars {
                let CspValue::NodeCoupling {
                    l_magnitude,
                    s_magnitude,
                } = values[variable]
                else {
                    return None;
                };
                let interaction = unit.node_settings.get(&node_id)?.interaction;
                node_props.insert(
                    node_id,
                    NodeProps {
                        interaction,
                        l_magnitude,
                        s_magnitude,
                    },
                );
            }
            Some(StateTransitionGraph::new(
                unit.topology.clone(),
                edge_props,
                node_props,
            ))
        })
        .collect()
}
