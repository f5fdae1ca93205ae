//! Test Utilities Crate
//!
//! Shared test infrastructure for the club dues test suite.
//!
//! # Modules
//!
//! - `memory`: In-memory adapters for every storage port, with real
//!   uniqueness and version-check semantics
//! - `fixtures`: Pre-built test data and a fully wired service set
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod memory;
pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use memory::*;
pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
