//! Deterministic problem contract checking.
//!
//! Registration already guarantees per-entity validity and referential
//! integrity. This pass looks across entities for conditions no single
//! registration can see: precedence chains that close on themselves,
//! fixed schedules that cannot fit the horizon, and entities a solver
//! would silently ignore. The report is deterministic for a given
//! problem, so it can be diffed and asserted on.

use crate::constraint::ConstraintDetail;
use crate::error::EntityKind;
use crate::problem::Problem;
use crate::resource::Resource;
use crate::task::TaskDuration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const PROBLEM_CHECK_KIND: &str = "shopfloor.problem.check.v1";

pub const FAILURE_CLASS_PRECEDENCE_CYCLE: &str = "problem.precedence.cycle";
pub const FAILURE_CLASS_HORIZON_OVERFLOW: &str = "problem.horizon.overflow";
pub const WARNING_CLASS_UNREFERENCED_RESOURCE: &str = "problem.resource.unreferenced";
pub const WARNING_CLASS_UNASSIGNED_TASK: &str = "problem.task.unassigned";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFinding {
    pub kind: EntityKind,
    pub name: String,
    pub class: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub task_count: usize,
    pub resource_count: usize,
    pub buffer_count: usize,
    pub constraint_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCheckReport {
    pub check_kind: String,
    pub problem: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub warning_classes: Vec<String>,
    pub errors: Vec<ProblemFinding>,
    pub warnings: Vec<ProblemFinding>,
    pub summary: ProblemSummary,
}

impl ProblemCheckReport {
    pub fn accepted(&self) -> bool {
        self.result == "accepted"
    }
}

fn collect_classes(findings: &[ProblemFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

fn find_cycle_edges<'a>(
    adjacency: &BTreeMap<&'a str, Vec<&'a str>>,
) -> Vec<(&'a str, &'a str)> {
    fn walk<'a>(
        node: &'a str,
        adjacency: &BTreeMap<&'a str, Vec<&'a str>>,
        state: &mut BTreeMap<&'a str, Visit>,
        back_edges: &mut Vec<(&'a str, &'a str)>,
    ) {
        state.insert(node, Visit::InProgress);
        if let Some(successors) = adjacency.get(node) {
            for successor in successors {
                match state.get(successor) {
                    Some(Visit::InProgress) => back_edges.push((node, successor)),
                    Some(Visit::Done) => {}
                    None => walk(successor, adjacency, state, back_edges),
                }
            }
        }
        state.insert(node, Visit::Done);
    }

    let mut state = BTreeMap::new();
    let mut back_edges = Vec::new();
    for node in adjacency.keys() {
        if !state.contains_key(node) {
            walk(node, adjacency, &mut state, &mut back_edges);
        }
    }
    back_edges
}

fn check_precedence_cycles(problem: &Problem, errors: &mut Vec<ProblemFinding>) {
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for constraint in problem.constraints() {
        if let ConstraintDetail::TaskPrecedence {
            task_before,
            task_after,
            ..
        } = &constraint.detail
        {
            adjacency
                .entry(task_before.as_str())
                .or_default()
                .push(task_after.as_str());
        }
    }

    for (from, to) in find_cycle_edges(&adjacency) {
        errors.push(ProblemFinding {
            kind: EntityKind::Task,
            name: from.to_string(),
            class: FAILURE_CLASS_PRECEDENCE_CYCLE.to_string(),
            message: format!("precedence `{from}` -> `{to}` closes a cycle"),
        });
    }
}

fn fixed_duration(problem: &Problem, task_name: &str) -> Option<u32> {
    match problem.task(task_name)?.duration {
        TaskDuration::Fixed(length) => Some(length),
        TaskDuration::Zero => Some(0),
        TaskDuration::Variable => None,
    }
}

fn check_horizon(problem: &Problem, errors: &mut Vec<ProblemFinding>) {
    let Some(horizon) = problem.horizon() else {
        return;
    };

    for task in problem.tasks() {
        if let TaskDuration::Fixed(length) = task.duration
            && length > horizon
        {
            errors.push(ProblemFinding {
                kind: EntityKind::Task,
                name: task.name.clone(),
                class: FAILURE_CLASS_HORIZON_OVERFLOW.to_string(),
                message: format!("duration {length} exceeds horizon {horizon}"),
            });
        }
    }

    for constraint in problem.constraints() {
        if let ConstraintDetail::TaskStartAt { task, value } = &constraint.detail
            && let Some(length) = fixed_duration(problem, task)
            && u64::from(*value) + u64::from(length) > u64::from(horizon)
        {
            errors.push(ProblemFinding {
                kind: EntityKind::Constraint,
                name: constraint.name.clone(),
                class: FAILURE_CLASS_HORIZON_OVERFLOW.to_string(),
                message: format!(
                    "task `{task}` pinned at {value} with duration {length} exceeds horizon {horizon}"
                ),
            });
        }
    }
}

fn referenced_resources<'a>(problem: &'a Problem) -> BTreeSet<&'a str> {
    let mut referenced = BTreeSet::new();
    for task in problem.tasks() {
        for name in &task.required_resources {
            referenced.insert(name.as_str());
        }
    }
    for resource in problem.resources() {
        if let Resource::SelectWorkers(selection) = resource {
            for name in &selection.workers {
                referenced.insert(name.as_str());
            }
        }
    }
    for constraint in problem.constraints() {
        match &constraint.detail {
            ConstraintDetail::SameWorkers {
                select_workers_1,
                select_workers_2,
            }
            | ConstraintDetail::DistinctWorkers {
                select_workers_1,
                select_workers_2,
            } => {
                referenced.insert(select_workers_1.as_str());
                referenced.insert(select_workers_2.as_str());
            }
            ConstraintDetail::WorkLoad { resource, .. }
            | ConstraintDetail::ResourceUnavailable { resource, .. }
            | ConstraintDetail::ResourceTasksDistance { resource, .. } => {
                referenced.insert(resource.as_str());
            }
            _ => {}
        }
    }
    referenced
}

fn check_idle_entities(problem: &Problem, warnings: &mut Vec<ProblemFinding>) {
    let referenced = referenced_resources(problem);
    for resource in problem.resources() {
        if !referenced.contains(resource.name()) {
            warnings.push(ProblemFinding {
                kind: EntityKind::Resource,
                name: resource.name().to_string(),
                class: WARNING_CLASS_UNREFERENCED_RESOURCE.to_string(),
                message: "never required by a task or named by a constraint".to_string(),
            });
        }
    }

    for task in problem.tasks() {
        // Milestones consume no resources; requiring them to would be noise.
        if task.required_resources.is_empty() && task.duration != TaskDuration::Zero {
            warnings.push(ProblemFinding {
                kind: EntityKind::Task,
                name: task.name.clone(),
                class: WARNING_CLASS_UNASSIGNED_TASK.to_string(),
                message: "requires no resources".to_string(),
            });
        }
    }
}

/// Run every cross-entity check over a registered problem.
pub fn check_problem(problem: &Problem) -> ProblemCheckReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_precedence_cycles(problem, &mut errors);
    check_horizon(problem, &mut errors);
    check_idle_entities(problem, &mut warnings);

    let failure_classes = collect_classes(&errors);
    let warning_classes = collect_classes(&warnings);
    let result = if errors.is_empty() {
        "accepted".to_string()
    } else {
        "rejected".to_string()
    };
    let summary = ProblemSummary {
        task_count: problem.tasks().len(),
        resource_count: problem.resources().len(),
        buffer_count: problem.buffers().len(),
        constraint_count: problem.constraints().len(),
        error_count: errors.len(),
        warning_count: warnings.len(),
    };

    ProblemCheckReport {
        check_kind: PROBLEM_CHECK_KIND.to_string(),
        problem: problem.name().to_string(),
        result,
        failure_classes,
        warning_classes,
        errors,
        warnings,
        summary,
    }
}
