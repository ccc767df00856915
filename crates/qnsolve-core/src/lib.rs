//! # qnsolve
//!
//! A constraint-based quantum-number solver for particle reactions: given an
//! initial and a final state, it determines which intermediate states,
//! vertex couplings and interaction types are allowed by the conservation
//! laws, and returns every allowed reaction as a fully assigned decay graph.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to keep
//! the physics, the search machinery, and the user-facing procedures
//! separate.
//!
//! - **[`core`]: The Foundation.** Stateless data models: exact spin and
//!   parity arithmetic, the particle database, and reaction topologies as
//!   directed graphs.
//!
//! - **[`engine`]: The Logic Core.** The stages of a search: combinatorial
//!   seeding of topologies, the conservation-rule library, and a
//!   finite-domain constraint solver that enumerates the consistent
//!   assignments.
//!
//! - **[`workflows`]: The Public API.** The highest-level layer, tying the
//!   engine and core together into complete procedures. Most users only
//!   need [`workflows::search::run`] with a [`engine::config::SearchConfig`].

pub mod core;
pub mod engine;
pub mod workflows;
