//! # Topology Module
//!
//! Reaction diagrams as directed graphs: interaction vertices connected by
//! edges that carry the particle states.
//!
//! ## Key Components
//!
//! - [`graph`] - The [`graph::Topology`] graph itself, its validation rules,
//!   and [`graph::StateTransitionGraph`] for attaching per-edge and per-node
//!   content
//! - [`generator`] - Enumeration of all distinct isobar topologies for a
//!   given number of initial- and final-state particles
//!
//! Edge ids double as the addressing scheme for everything downstream: facts,
//! constraint variables, and solutions are all keyed by the ids established
//! here.

pub mod generator;
pub mod graph;
