use crate::core::quantum::InteractionType;
use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

pub type NodeId = usize;
pub type EdgeId = usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error(
        "cannot build isobar topologies for {n_initial} initial and {n_final} final state \
         particles; the initial state needs 1 or 2 particles and the final state at least 2"
    )]
    InvalidStateCount { n_initial: usize, n_final: usize },

    #[error("edge {edge_id} references node {node_id}, which is not part of the topology")]
    UnknownNode { edge_id: EdgeId, node_id: NodeId },

    #[error("edge {0} is attached to no node at all")]
    DanglingEdge(EdgeId),

    #[error("node {node_id} has {count} incoming edges; only a collision vertex may have two")]
    TooManyIncoming { node_id: NodeId, count: usize },

    #[error("node {0} has no outgoing edges")]
    NoOutgoing(NodeId),

    #[error("the topology is not connected")]
    Disconnected,

    #[error("the topology contains a cycle")]
    Cyclic,
}

/// A directed edge of a reaction diagram.
///
/// An absent `originating_node` marks an initial-state edge, an absent
/// `ending_node` a final-state edge. Edges with both ends attached are
/// intermediate states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Edge {
    pub originating_node: Option<NodeId>,
    pub ending_node: Option<NodeId>,
}

impl Edge {
    /// An initial-state edge ending at `node`.
    pub fn incoming(node: NodeId) -> Self {
        Self {
            originating_node: None,
            ending_node: Some(node),
        }
    }

    /// A final-state edge originating at `node`.
    pub fn outgoing(node: NodeId) -> Self {
        Self {
            originating_node: Some(node),
            ending_node: None,
        }
    }

    /// An intermediate edge connecting two interaction vertices.
    pub fn internal(from: NodeId, to: NodeId) -> Self {
        Self {
            originating_node: Some(from),
            ending_node: Some(to),
        }
    }

    pub fn is_initial_state(&self) -> bool {
        self.originating_node.is_none()
    }

    pub fn is_final_state(&self) -> bool {
        self.ending_node.is_none()
    }

    pub fn is_intermediate(&self) -> bool {
        self.originating_node.is_some() && self.ending_node.is_some()
    }
}

/// The bare graph of a reaction: interaction vertices connected by directed
/// edges, before any particle content is assigned.
///
/// Node and edge ids are stable keys. They are used to correlate particle
/// assignments across permutations, so two topologies are the same if and
/// only if they are equal as id-labeled graphs; the generator guarantees a
/// canonical numbering so that structurally identical trees never differ in
/// labeling.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Topology {
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<EdgeId, Edge>,
}

impl Topology {
    /// Creates a validated topology.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the graph is disconnected, cyclic,
    /// references unknown nodes, or violates the vertex degree constraints
    /// (at most one incoming edge per node, except a collision vertex with
    /// two initial-state edges; at least one outgoing edge per node).
    pub fn new(
        nodes: BTreeSet<NodeId>,
        edges: BTreeMap<EdgeId, Edge>,
    ) -> Result<Self, TopologyError> {
        let topology = Self { nodes, edges };
        topology.validate()?;
        Ok(topology)
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, Edge> {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Ids of initial-state edges, ascending.
    pub fn incoming_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_initial_state)
    }

    /// Ids of final-state edges, ascending.
    pub fn outgoing_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_final_state)
    }

    /// Ids of intermediate edges, ascending.
    pub fn intermediate_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_intermediate)
    }

    fn edge_ids_where(&self, predicate: impl Fn(&Edge) -> bool) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| predicate(edge))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Ids of edges originating at `node`, ascending.
    pub fn edges_from(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| edge.originating_node == Some(node))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Ids of edges ending at `node`, ascending.
    pub fn edges_to(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| edge.ending_node == Some(node))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Ids of the final-state edges in the subtree below `node`, ascending.
    pub fn originating_final_state_edge_ids(&self, node: NodeId) -> Vec<EdgeId> {
        let mut result = BTreeSet::new();
        let mut pending = VecDeque::from([node]);
        while let Some(current) = pending.pop_front() {
            for id in self.edges_from(current) {
                match self.edges[&id].ending_node {
                    Some(child) => pending.push_back(child),
                    None => {
                        result.insert(id);
                    }
                }
            }
        }
        result.into_iter().collect()
    }

    /// Ids of the initial-state edges feeding into `node` from above, ascending.
    pub fn originating_initial_state_edge_ids(&self, node: NodeId) -> Vec<EdgeId> {
        let mut result = BTreeSet::new();
        let mut pending = VecDeque::from([node]);
        while let Some(current) = pending.pop_front() {
            for id in self.edges_to(current) {
                match self.edges[&id].originating_node {
                    Some(parent) => pending.push_back(parent),
                    None => {
                        result.insert(id);
                    }
                }
            }
        }
        result.into_iter().collect()
    }

    /// A copy with the edge structs at `id1` and `id2` exchanged.
    ///
    /// Any properties keyed by edge id stay in place, so this moves the two
    /// edges' attachment points while keeping their assigned content.
    pub fn swap_edges(&self, id1: EdgeId, id2: EdgeId) -> Topology {
        let mut edges = self.edges.clone();
        if let (Some(&edge1), Some(&edge2)) = (self.edges.get(&id1), self.edges.get(&id2)) {
            edges.insert(id1, edge2);
            edges.insert(id2, edge1);
        }
        Topology {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// A copy in which the listed edges have their originating node replaced.
    ///
    /// Callers must pass a permutation of the edges' current originating
    /// nodes, which keeps every vertex degree unchanged.
    pub(crate) fn reassign_edge_origins(&self, origins: &BTreeMap<EdgeId, NodeId>) -> Topology {
        let mut edges = self.edges.clone();
        for (&edge_id, &node_id) in origins {
            if let Some(edge) = edges.get_mut(&edge_id) {
                edge.originating_node = Some(node_id);
            }
        }
        Topology {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// A copy with edge ids relabeled according to `mapping` (old id to new
    /// id); ids absent from the mapping keep their label.
    pub(crate) fn relabel_edges(&self, mapping: &BTreeMap<EdgeId, EdgeId>) -> Topology {
        let edges = self
            .edges
            .iter()
            .map(|(&id, &edge)| (*mapping.get(&id).unwrap_or(&id), edge))
            .collect();
        Topology {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    fn validate(&self) -> Result<(), TopologyError> {
        for (&edge_id, edge) in &self.edges {
            if edge.originating_node.is_none() && edge.ending_node.is_none() {
                return Err(TopologyError::DanglingEdge(edge_id));
            }
            for node_id in [edge.originating_node, edge.ending_node].into_iter().flatten() {
                if !self.nodes.contains(&node_id) {
                    return Err(TopologyError::UnknownNode { edge_id, node_id });
                }
            }
        }
        for &node in &self.nodes {
            let incoming = self.edges_to(node);
            let all_initial = incoming
                .iter()
                .all(|id| self.edges[id].is_initial_state());
            let limit = if all_initial { 2 } else { 1 };
            if incoming.len() > limit {
                return Err(TopologyError::TooManyIncoming {
                    node_id: node,
                    count: incoming.len(),
                });
            }
            if self.edges_from(node).is_empty() {
                return Err(TopologyError::NoOutgoing(node));
            }
        }
        self.check_connectivity()?;
        self.check_acyclicity()
    }

    fn check_connectivity(&self) -> Result<(), TopologyError> {
        let Some(&start) = self.nodes.first() else {
            return Ok(());
        };
        let mut seen = BTreeSet::from([start]);
        let mut pending = VecDeque::from([start]);
        while let Some(current) = pending.pop_front() {
            for edge in self.edges.values() {
                let neighbor = match (edge.originating_node, edge.ending_node) {
                    (Some(a), Some(b)) if a == current => Some(b),
                    (Some(a), Some(b)) if b == current => Some(a),
                    _ => None,
                };
                if let Some(neighbor) = neighbor {
                    if seen.insert(neighbor) {
                        pending.push_back(neighbor);
                    }
                }
            }
        }
        if seen.len() == self.nodes.len() {
            Ok(())
        } else {
            Err(TopologyError::Disconnected)
        }
    }

    fn check_acyclicity(&self) -> Result<(), TopologyError> {
        // Follow internal edges downward; revisiting a node means a cycle.
        for &start in &self.nodes {
            let mut seen = BTreeSet::from([start]);
            let mut pending = VecDeque::from([start]);
            while let Some(current) = pending.pop_front() {
                for id in self.edges_from(current) {
                    if let Some(child) = self.edges[&id].ending_node {
                        if !seen.insert(child) {
                            return Err(TopologyError::Cyclic);
                        }
                        pending.push_back(child);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Coupling quantum numbers assigned to an interaction vertex of a solved
/// graph: the interaction regime plus orbital angular momentum `l` and
/// coupled spin `s`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeProps {
    pub interaction: InteractionType,
    pub l_magnitude: Ratio<i32>,
    pub s_magnitude: Ratio<i32>,
}

/// A topology with content attached: per-edge data of type `E` and per-node
/// coupling quantum numbers.
///
/// The graph owns its topology by value, so graphs derived from a common
/// template never alias each other.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateTransitionGraph<E> {
    topology: Topology,
    edge_props: BTreeMap<EdgeId, E>,
    node_props: BTreeMap<NodeId, NodeProps>,
}

impl<E> StateTransitionGraph<E> {
    pub fn new(
        topology: Topology,
        edge_props: BTreeMap<EdgeId, E>,
        node_props: BTreeMap<NodeId, NodeProps>,
    ) -> Self {
        Self {
            topology,
            edge_props,
            node_props,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn edge_props(&self, id: EdgeId) -> Option<&E> {
        self.edge_props.get(&id)
    }

    pub fn node_props(&self, id: NodeId) -> Option<&NodeProps> {
        self.node_props.get(&id)
    }

    pub fn edge_props_iter(&self) -> impl Iterator<Item = (EdgeId, &E)> {
        self.edge_props.iter().map(|(&id, props)| (id, props))
    }

    pub fn node_props_iter(&self) -> impl Iterator<Item = (NodeId, NodeProps)> + '_ {
        self.node_props.iter().map(|(&id, &props)| (id, props))
    }

    /// A copy whose topology has the given final-state edges reattached to
    /// new originating nodes; edge properties stay with their edge ids.
    pub(crate) fn with_edge_origins(&self, origins: &BTreeMap<EdgeId, NodeId>) -> Self
    where
        E: Clone,
    {
        Self {
            topology: self.topology.reassign_edge_origins(origins),
            edge_props: self.edge_props.clone(),
            node_props: self.node_props.clone(),
        }
    }
}
