//! Constraints: typed restrictions linking tasks, resources, and buffers.

use crate::error::ModelError;
use crate::interval::TimeInterval;

/// Ordering discipline between a predecessor's end and a successor's start.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PrecedenceKind {
    /// end + offset <= start
    #[default]
    Lax,
    /// end + offset < start
    Strict,
    /// end + offset == start
    Tight,
}

impl PrecedenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecedenceKind::Lax => "lax",
            PrecedenceKind::Strict => "strict",
            PrecedenceKind::Tight => "tight",
        }
    }
}

/// How a numeric bound is applied: as an exact target, a floor, or a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Exact,
    Min,
    Max,
}

impl BoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundKind::Exact => "exact",
            BoundKind::Min => "min",
            BoundKind::Max => "max",
        }
    }
}

/// A bound on worked periods within one time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkLoadBound {
    pub time_interval: TimeInterval,
    pub bound: u32,
}

/// The closed set of constraint variants. Reference fields hold names of
/// entities registered in the same problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintDetail {
    /// `task_after` starts only after `task_before` ends, plus `offset`.
    TaskPrecedence {
        task_before: String,
        task_after: String,
        offset: u32,
        kind: PrecedenceKind,
    },
    /// The task starts exactly at `value`.
    TaskStartAt { task: String, value: u32 },
    /// The task deposits `quantity` units into the buffer on completion.
    TaskLoadBuffer {
        task: String,
        buffer: String,
        quantity: i64,
    },
    /// The task withdraws `quantity` units from the buffer on start.
    TaskUnloadBuffer {
        task: String,
        buffer: String,
        quantity: i64,
    },
    /// Both selections must resolve to the same worker subset.
    SameWorkers {
        select_workers_1: String,
        select_workers_2: String,
    },
    /// The selections must resolve to disjoint worker subsets.
    DistinctWorkers {
        select_workers_1: String,
        select_workers_2: String,
    },
    /// Bounds on the periods a worker spends busy inside given intervals.
    WorkLoad {
        resource: String,
        bounds: Vec<WorkLoadBound>,
        kind: BoundKind,
    },
    /// The worker must stay idle during every listed interval.
    ResourceUnavailable {
        resource: String,
        intervals: Vec<TimeInterval>,
    },
    /// Bound on the gap between consecutive tasks on one worker. An empty
    /// interval list applies the bound over the whole timeline.
    ResourceTasksDistance {
        resource: String,
        distance: u32,
        mode: BoundKind,
        intervals: Vec<TimeInterval>,
    },
}

impl ConstraintDetail {
    /// The document discriminator for this constraint's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstraintDetail::TaskPrecedence { .. } => "TaskPrecedence",
            ConstraintDetail::TaskStartAt { .. } => "TaskStartAt",
            ConstraintDetail::TaskLoadBuffer { .. } => "TaskLoadBuffer",
            ConstraintDetail::TaskUnloadBuffer { .. } => "TaskUnloadBuffer",
            ConstraintDetail::SameWorkers { .. } => "SameWorkers",
            ConstraintDetail::DistinctWorkers { .. } => "DistinctWorkers",
            ConstraintDetail::WorkLoad { .. } => "WorkLoad",
            ConstraintDetail::ResourceUnavailable { .. } => "ResourceUnavailable",
            ConstraintDetail::ResourceTasksDistance { .. } => "ResourceTasksDistance",
        }
    }
}

/// A registered constraint: a possibly generated unique name, an optional
/// flag, and the variant payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub optional: bool,
    pub detail: ConstraintDetail,
}

impl Constraint {
    /// A constraint with an explicit name.
    pub fn named(name: impl Into<String>, detail: ConstraintDetail) -> Self {
        Constraint {
            name: name.into(),
            optional: false,
            detail,
        }
    }

    /// A constraint with a generated `<Discriminator>_<8 hex>` name.
    pub fn anonymous(detail: ConstraintDetail) -> Self {
        let name = generated_name(detail.type_name());
        Constraint {
            name,
            optional: false,
            detail,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.detail.type_name()
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let label = format!("constraint `{}`", self.name);
        if self.name.is_empty() {
            return Err(ModelError::invalid(label, "name", "must be non-empty"));
        }
        match &self.detail {
            ConstraintDetail::TaskLoadBuffer { quantity, .. }
            | ConstraintDetail::TaskUnloadBuffer { quantity, .. } => {
                if *quantity < 1 {
                    return Err(ModelError::invalid(
                        label,
                        "quantity",
                        "must be at least 1",
                    ));
                }
            }
            ConstraintDetail::WorkLoad { bounds, .. } => {
                if bounds.is_empty() {
                    return Err(ModelError::invalid(
                        label,
                        "time_intervals_and_bounds",
                        "must not be empty",
                    ));
                }
            }
            ConstraintDetail::ResourceUnavailable { intervals, .. } => {
                if intervals.is_empty() {
                    return Err(ModelError::invalid(
                        label,
                        "list_of_time_intervals",
                        "must not be empty",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// `<prefix>_<first 8 hex chars of a v4 uuid>`, unique enough for one problem.
pub fn generated_name(prefix: &str) -> String {
    let uid = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &uid[..8])
}
