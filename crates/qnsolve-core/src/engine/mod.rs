//! # Engine Module
//!
//! The stateful logic core of the library: everything between a validated
//! configuration and a list of solved reaction graphs.
//!
//! ## Overview
//!
//! A search proceeds in stages, each owned by one submodule:
//!
//! - [`config`] - The [`config::SearchConfig`] describing a search, built
//!   through a validating builder
//! - [`combinatorics`] - Distributing external particles and their spin
//!   projections over the outer edges of each topology
//! - [`rules`] - The conservation laws checked at every interaction vertex
//! - [`csp`] - A generic finite-domain backtracking solver
//! - [`solving`] - Assembling one [`solving::SearchUnit`] into a constraint
//!   problem and decoding its solutions into state transition graphs
//! - [`error`] - The [`error::EngineError`] taxonomy wrapping the stage
//!   errors
//!
//! The driver that wires these stages together lives in
//! [`crate::workflows`].

pub mod combinatorics;
pub mod config;
pub mod csp;
pub mod error;
pub mod rules;
pub mod solving;
