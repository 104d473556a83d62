//! Resources: workers, cumulative workers, and worker selections.

use crate::error::ModelError;

/// How a selection's worker count bound is applied at solve time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    #[default]
    Exact,
    Min,
    Max,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Exact => "exact",
            SelectionKind::Min => "min",
            SelectionKind::Max => "max",
        }
    }
}

/// An atomic resource that cannot be split: a person, a machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub name: String,
    pub productivity: f64,
    pub cost: Option<f64>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        Worker {
            name: name.into(),
            productivity: 1.0,
            cost: None,
        }
    }
}

/// A resource that can process up to `size` tasks in parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeWorker {
    pub name: String,
    pub productivity: f64,
    pub cost: Option<f64>,
    pub size: u32,
}

impl CumulativeWorker {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        CumulativeWorker {
            name: name.into(),
            productivity: 1.0,
            cost: None,
            size,
        }
    }
}

/// Selection of `nb_workers_to_select` workers out of an ordered candidate
/// list. Not schedulable itself; it resolves to a worker subset at solve
/// time. The list holds names of workers registered in the same problem.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectWorkers {
    pub name: String,
    pub workers: Vec<String>,
    pub nb_workers_to_select: usize,
    pub kind: SelectionKind,
}

impl SelectWorkers {
    pub fn new(name: impl Into<String>, workers: Vec<String>) -> Self {
        SelectWorkers {
            name: name.into(),
            workers,
            nb_workers_to_select: 1,
            kind: SelectionKind::Exact,
        }
    }
}

/// The closed set of resource variants a problem can register.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Worker(Worker),
    CumulativeWorker(CumulativeWorker),
    SelectWorkers(SelectWorkers),
}

impl Resource {
    pub fn name(&self) -> &str {
        match self {
            Resource::Worker(worker) => &worker.name,
            Resource::CumulativeWorker(worker) => &worker.name,
            Resource::SelectWorkers(select) => &select.name,
        }
    }

    /// The document discriminator for this resource's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Resource::Worker(_) => "Worker",
            Resource::CumulativeWorker(_) => "CumulativeWorker",
            Resource::SelectWorkers(_) => "SelectWorkers",
        }
    }

    /// True for resources the solver can place on the timeline directly.
    /// Selections resolve to schedulable workers instead.
    pub fn is_schedulable(&self) -> bool {
        !matches!(self, Resource::SelectWorkers(_))
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        match self {
            Resource::Worker(worker) => {
                validate_worker_fields(&worker.name, worker.productivity, worker.cost)
            }
            Resource::CumulativeWorker(worker) => {
                validate_worker_fields(&worker.name, worker.productivity, worker.cost)?;
                if worker.size == 0 {
                    return Err(ModelError::invalid(
                        format!("resource `{}`", worker.name),
                        "size",
                        "must be at least 1",
                    ));
                }
                Ok(())
            }
            Resource::SelectWorkers(select) => {
                let label = format!("resource `{}`", select.name);
                if select.name.is_empty() {
                    return Err(ModelError::invalid(label, "name", "must be non-empty"));
                }
                if select.workers.is_empty() {
                    return Err(ModelError::invalid(
                        label,
                        "list_of_workers",
                        "must not be empty",
                    ));
                }
                if select.nb_workers_to_select == 0 {
                    return Err(ModelError::invalid(
                        label,
                        "nb_workers_to_select",
                        "must be at least 1",
                    ));
                }
                if select.nb_workers_to_select > select.workers.len() {
                    return Err(ModelError::invalid(
                        label,
                        "nb_workers_to_select",
                        format!(
                            "must not exceed the candidate count ({} > {})",
                            select.nb_workers_to_select,
                            select.workers.len()
                        ),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn validate_worker_fields(name: &str, productivity: f64, cost: Option<f64>) -> Result<(), ModelError> {
    let label = format!("resource `{name}`");
    if name.is_empty() {
        return Err(ModelError::invalid(label, "name", "must be non-empty"));
    }
    if !productivity.is_finite() || productivity < 0.0 {
        return Err(ModelError::invalid(
            label,
            "productivity",
            "must be a finite non-negative number",
        ));
    }
    if let Some(cost) = cost {
        if !cost.is_finite() {
            return Err(ModelError::invalid(label, "cost", "must be a finite number"));
        }
    }
    Ok(())
}

impl From<Worker> for Resource {
    fn from(worker: Worker) -> Self {
        Resource::Worker(worker)
    }
}

impl From<CumulativeWorker> for Resource {
    fn from(worker: CumulativeWorker) -> Self {
        Resource::CumulativeWorker(worker)
    }
}

impl From<SelectWorkers> for Resource {
    fn from(select: SelectWorkers) -> Self {
        Resource::SelectWorkers(select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_defaults_match_documented_values() {
        let worker = Worker::new("W1");
        assert_eq!(worker.productivity, 1.0);
        assert_eq!(worker.cost, None);
        assert_eq!(Resource::from(worker).type_name(), "Worker");
    }

    #[test]
    fn selection_count_is_bounded_by_candidate_list() {
        let mut select = SelectWorkers::new(
            "SW",
            vec!["W1".to_string(), "W2".to_string()],
        );
        select.nb_workers_to_select = 3;
        let err = Resource::from(select).validate().expect_err("count above list length");
        assert!(matches!(
            err,
            ModelError::InvalidEntity { ref field, .. } if field == "nb_workers_to_select"
        ));
    }

    #[test]
    fn selection_requires_candidates() {
        let select = SelectWorkers::new("SW", Vec::new());
        let err = Resource::from(select).validate().expect_err("empty candidate list");
        assert!(matches!(
            err,
            ModelError::InvalidEntity { ref field, .. } if field == "list_of_workers"
        ));
    }

    #[test]
    fn cumulative_worker_needs_capacity() {
        let worker = CumulativeWorker::new("CW", 0);
        assert!(Resource::from(worker).validate().is_err());
        let worker = CumulativeWorker::new("CW", 3);
        Resource::from(worker).validate().expect("positive capacity");
    }

    #[test]
    fn selections_are_not_schedulable() {
        let select = SelectWorkers::new("SW", vec!["W1".to_string()]);
        assert!(!Resource::from(select).is_schedulable());
        assert!(Resource::from(Worker::new("W1")).is_schedulable());
    }
}
