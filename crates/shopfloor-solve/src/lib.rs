//! # shopfloor-solve
//!
//! Solver boundary for scheduling problems.
//!
//! This crate provides:
//! - the `Solver` trait (opaque handoff of an assembled `Problem`)
//! - `SolveOutcome` (solved with a `Schedule`, or unsatisfiable)
//! - `SolverConfig` with its document encoding
//!
//! It intentionally ships no solving algorithm: backends adapt an external
//! constraint or SMT engine behind the trait.

pub mod config;
pub mod schedule;
pub mod solver;

pub use config::{SOLVER_CONFIG_TYPE_NAME, SolverConfig, decode_config, encode_config};
pub use schedule::{Schedule, TaskAssignment};
pub use solver::{SolveOutcome, Solver, SolverError};
