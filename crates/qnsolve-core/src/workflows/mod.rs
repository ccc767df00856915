//! # Workflows Module
//!
//! The public, user-facing layer. A workflow ties the [`crate::core`] data
//! model and the [`crate::engine`] stages together into one complete
//! procedure with a single entry point.
//!
//! - [`search`] - Runs a full quantum-number search: topology generation,
//!   seeding, constraint solving, and normalization of the results

pub mod search;
