//! Tasks: the units of work a schedule places on the timeline.

use crate::error::ModelError;

/// How a task's duration is determined.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDuration {
    /// Takes exactly this many periods (at least 1).
    Fixed(u32),
    /// Milestone: starts and ends at the same instant.
    Zero,
    /// Duration left to the solver.
    Variable,
}

/// A unit of work. Variants differ only in how the duration is fixed.
///
/// `required_resources` holds names of resources registered in the same
/// problem; the task references them, it does not own them.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub duration: TaskDuration,
    pub optional: bool,
    pub priority: i32,
    pub work_amount: f64,
    pub required_resources: Vec<String>,
}

impl Task {
    /// A task taking exactly `duration` periods.
    pub fn fixed(name: impl Into<String>, duration: u32) -> Self {
        Task::with_duration(name, TaskDuration::Fixed(duration))
    }

    /// A zero-duration milestone task.
    pub fn zero(name: impl Into<String>) -> Self {
        Task::with_duration(name, TaskDuration::Zero)
    }

    /// A task whose duration the solver derives.
    pub fn variable(name: impl Into<String>) -> Self {
        Task::with_duration(name, TaskDuration::Variable)
    }

    fn with_duration(name: impl Into<String>, duration: TaskDuration) -> Self {
        Task {
            name: name.into(),
            duration,
            optional: false,
            priority: 0,
            work_amount: 0.0,
            required_resources: Vec::new(),
        }
    }

    /// The document discriminator for this task's variant.
    pub fn type_name(&self) -> &'static str {
        match self.duration {
            TaskDuration::Fixed(_) => "FixedDurationTask",
            TaskDuration::Zero => "ZeroDurationTask",
            TaskDuration::Variable => "VariableDurationTask",
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let label = format!("task `{}`", self.name);
        if self.name.is_empty() {
            return Err(ModelError::invalid(label, "name", "must be non-empty"));
        }
        if let TaskDuration::Fixed(duration) = self.duration {
            if duration == 0 {
                return Err(ModelError::invalid(label, "duration", "must be at least 1"));
            }
        }
        if !self.work_amount.is_finite() || self.work_amount < 0.0 {
            return Err(ModelError::invalid(
                label,
                "work_amount",
                "must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_apply_documented_defaults() {
        let task = Task::fixed("T1", 3);
        assert_eq!(task.duration, TaskDuration::Fixed(3));
        assert!(!task.optional);
        assert_eq!(task.priority, 0);
        assert_eq!(task.work_amount, 0.0);
        assert!(task.required_resources.is_empty());
        assert_eq!(task.type_name(), "FixedDurationTask");

        assert_eq!(Task::zero("M").type_name(), "ZeroDurationTask");
        assert_eq!(Task::variable("V").type_name(), "VariableDurationTask");
    }

    #[test]
    fn fixed_duration_must_be_positive() {
        let err = Task::fixed("T1", 0).validate().expect_err("zero fixed duration");
        assert!(matches!(err, ModelError::InvalidEntity { ref field, .. } if field == "duration"));
    }

    #[test]
    fn work_amount_must_be_finite_and_non_negative() {
        let mut task = Task::variable("V");
        task.work_amount = -1.0;
        assert!(task.validate().is_err());
        task.work_amount = f64::NAN;
        assert!(task.validate().is_err());
        task.work_amount = 2.5;
        task.validate().expect("valid work amount");
    }
}
