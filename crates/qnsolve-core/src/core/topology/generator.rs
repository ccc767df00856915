//! Enumeration of isobar decay topologies.
//!
//! An isobar topology is a rooted tree in which every interaction vertex has
//! exactly two outgoing lines. Two topologies that differ only by the order
//! of the two lines at a vertex describe the same physics, so generation
//! works on unordered tree shapes and materializes each shape exactly once
//! with a canonical node and edge numbering.

use super::graph::{Edge, Topology, TopologyError};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// An unordered binary tree shape, identified up to child order.
///
/// `Branch` children are kept sorted so that structurally equal shapes
/// compare equal, which is what deduplicates mirror-image trees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Shape {
    Leaf,
    Branch(Box<Shape>, Box<Shape>),
}

impl Shape {
    fn branch(a: Shape, b: Shape) -> Shape {
        if a <= b {
            Shape::Branch(Box::new(a), Box::new(b))
        } else {
            Shape::Branch(Box::new(b), Box::new(a))
        }
    }
}

/// All distinct unordered binary tree shapes with `n_leaves` leaves,
/// in canonical order.
fn shapes(n_leaves: usize, memo: &mut BTreeMap<usize, Vec<Shape>>) -> Vec<Shape> {
    if let Some(cached) = memo.get(&n_leaves) {
        return cached.clone();
    }
    let result: Vec<Shape> = if n_leaves == 1 {
        vec![Shape::Leaf]
    } else {
        let mut unique = BTreeSet::new();
        for left_leaves in 1..=n_leaves / 2 {
            let left_shapes = shapes(left_leaves, memo);
            let right_shapes = shapes(n_leaves - left_leaves, memo);
            for left in &left_shapes {
                for right in &right_shapes {
                    unique.insert(Shape::branch(left.clone(), right.clone()));
                }
            }
        }
        unique.into_iter().collect()
    };
    memo.insert(n_leaves, result.clone());
    result
}

/// Turns a tree shape into a [`Topology`] with the canonical numbering.
///
/// Nodes are numbered breadth-first from the root vertex 0. Edge ids start
/// with the initial-state edges (all attached to the root), then follow the
/// nodes in id order, at each node internal edges before final-state edges.
/// Internal children of a vertex are visited before its leaf children, so
/// deeper structure always sits on the lower edge ids.
fn materialize(shape: &Shape, n_initial: usize) -> Result<Topology, TopologyError> {
    let mut nodes = BTreeSet::from([0]);
    let mut edges: BTreeMap<usize, Edge> = (0..n_initial).map(|id| (id, Edge::incoming(0))).collect();
    let mut next_node = 1;
    let mut next_edge = n_initial;
    let mut pending = VecDeque::from([(0usize, shape)]);
    while let Some((node, current)) = pending.pop_front() {
        let Shape::Branch(left, right) = current else {
            continue;
        };
        let children = [left.as_ref(), right.as_ref()];
        for &child in children.iter().filter(|c| matches!(c, Shape::Branch(..))) {
            nodes.insert(next_node);
            edges.insert(next_edge, Edge::internal(node, next_node));
            pending.push_back((next_node, child));
            next_node += 1;
            next_edge += 1;
        }
        for _ in children.iter().filter(|c| matches!(c, Shape::Leaf)) {
            edges.insert(next_edge, Edge::outgoing(node));
            next_edge += 1;
        }
    }
    Topology::new(nodes, edges)
}

/// Generates every distinct isobar topology for the given reaction shape.
///
/// The initial state (one decaying particle, or two colliding ones) always
/// attaches to vertex 0. The returned list is deterministic: topologies are
/// ordered by their canonical shape.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidStateCount`] unless `n_initial` is 1 or 2
/// and `n_final` is at least 2.
pub fn generate_isobar_topologies(
    n_initial: usize,
    n_final: usize,
) -> Result<Vec<Topology>, TopologyError> {
    if !(1..=2).contains(&n_initial) || n_final < 2 {
        return Err(TopologyError::InvalidStateCount { n_initial, n_final });
    }
    let mut memo = BTreeMap::new();
    let topologies = shapes(n_final, &mut memo)
        .iter()
        .map(|shape| materialize(shape, n_initial))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        n_initial,
        n_final,
        count = topologies.len(),
        "generated isobar topologies"
    );
    Ok(topologies)
}
