//! # Core Module
//!
//! The stateless foundation of the library: the vocabulary of quantum numbers,
//! the particle database, and the reaction-graph model that the search engine
//! operates on.
//!
//! ## Key Components
//!
//! - [`quantum`] - Exact spin, parity, and interaction-type primitives
//! - [`particle`] - The [`particle::Particle`] definition, its builder, and
//!   the [`particle::ParticleCollection`] database
//! - [`topology`] - Reaction diagrams as directed graphs, plus the generator
//!   that enumerates all distinct isobar topologies
//!
//! Everything in this layer is plain data with validated constructors; the
//! combinatorics and constraint solving live in [`crate::engine`].

pub mod particle;
pub mod quantum;
pub mod topology;
