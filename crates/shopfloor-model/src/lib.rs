//! # shopfloor-model
//!
//! Typed scheduling-problem model.
//!
//! This crate provides:
//! - `Task`, `Resource`, `Buffer` and `Constraint` types (the definables)
//! - `Problem` (name-indexed registration with referential integrity)
//! - `Workbench` (explicit current-problem context for terse scripts)
//! - Deterministic cross-entity contract checks (`check_problem`)
//!
//! It intentionally does not serialize documents or talk to solvers.
//! Those concerns live in sibling crates (`shopfloor-doc`,
//! `shopfloor-solve`).
//!
//! ## Data model
//!
//! ```text
//! Task / Resource / Buffer / Constraint (validated at construction)
//!     ↓  add_* (duplicate + reference gate)
//! Problem (registration order preserved, names unique per category)
//!     ↓  check_problem
//! ProblemCheckReport (deterministic, diffable)
//! ```

pub mod buffer;
pub mod check;
pub mod constraint;
pub mod context;
pub mod error;
pub mod interval;
pub mod problem;
pub mod resource;
pub mod task;

pub use buffer::{Buffer, NonConcurrentBuffer};
pub use check::{
    FAILURE_CLASS_HORIZON_OVERFLOW, FAILURE_CLASS_PRECEDENCE_CYCLE, PROBLEM_CHECK_KIND,
    ProblemCheckReport, ProblemFinding, ProblemSummary, WARNING_CLASS_UNASSIGNED_TASK,
    WARNING_CLASS_UNREFERENCED_RESOURCE, check_problem,
};
pub use constraint::{
    BoundKind, Constraint, ConstraintDetail, PrecedenceKind, WorkLoadBound, generated_name,
};
pub use context::Workbench;
pub use error::{EntityKind, ModelError};
pub use interval::TimeInterval;
pub use problem::{Entity, Problem};
pub use resource::{CumulativeWorker, Resource, SelectWorkers, SelectionKind, Worker};
pub use task::{Task, TaskDuration};
