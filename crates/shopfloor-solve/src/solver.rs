//! The opaque boundary to an external solving backend.
//!
//! No backend ships in this workspace. Implementations adapt a constraint
//! or SMT engine; callers hand over a fully assembled problem and read the
//! outcome. "No schedule exists" is an outcome, not an error — errors are
//! reserved for backend faults and bad configuration.

use shopfloor_model::Problem;

use crate::config::SolverConfig;
use crate::schedule::Schedule;

/// What a backend reports for a well-formed problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Schedule),
    /// The constraints admit no schedule within the horizon.
    Unsatisfiable,
}

/// Faults at the solver boundary, distinct from unsatisfiability.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("invalid solver configuration: field `{field}` {message}")]
    Config { field: String, message: String },

    #[error("solver backend failure: {message}")]
    Backend { message: String },
}

/// An external solving capability.
pub trait Solver {
    fn solve(&self, problem: &Problem, config: &SolverConfig) -> Result<SolveOutcome, SolverError>;
}
