//! Solution types a backend returns for a solved problem.

/// Placement of one task on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaskAssignment {
    pub task: String,
    pub start: u32,
    pub end: u32,
    /// Names of the resources the backend picked for this task.
    pub resources: Vec<String>,
    /// False when an optional task was left out of the schedule. Unscheduled
    /// assignments keep `start == end == 0` and an empty resource list.
    pub scheduled: bool,
}

impl TaskAssignment {
    /// A task placed on the timeline.
    pub fn placed(task: impl Into<String>, start: u32, end: u32) -> Self {
        TaskAssignment {
            task: task.into(),
            start,
            end,
            resources: Vec::new(),
            scheduled: true,
        }
    }

    /// An optional task the backend chose to skip.
    pub fn skipped(task: impl Into<String>) -> Self {
        TaskAssignment {
            task: task.into(),
            start: 0,
            end: 0,
            resources: Vec::new(),
            scheduled: false,
        }
    }
}

/// A complete answer for one problem, one assignment per task.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schedule {
    /// Name of the problem this schedule answers.
    pub problem: String,
    /// The horizon the backend actually used.
    pub horizon: u32,
    pub assignments: Vec<TaskAssignment>,
}

impl Schedule {
    pub fn new(problem: impl Into<String>, horizon: u32) -> Self {
        Schedule {
            problem: problem.into(),
            horizon,
            assignments: Vec::new(),
        }
    }

    pub fn assignment(&self, task: &str) -> Option<&TaskAssignment> {
        self.assignments
            .iter()
            .find(|assignment| assignment.task == task)
    }

    /// Latest end instant over scheduled assignments; 0 for an empty or
    /// all-skipped schedule.
    pub fn makespan(&self) -> u32 {
        self.assignments
            .iter()
            .filter(|assignment| assignment.scheduled)
            .map(|assignment| assignment.end)
            .max()
            .unwrap_or(0)
    }
}
