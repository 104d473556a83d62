//! The workbench: an explicit, caller-owned current-problem context.
//!
//! There is no process-global active problem. A `Workbench` owns a set of
//! problems and a current slot; its convenience methods thread the current
//! problem through a sequence of registrations, which keeps single-problem
//! scripts terse without ambient state. Creating a problem makes it
//! current (last-writer-wins); disposing the current problem empties the
//! slot so later convenience calls fail instead of touching a stale handle.

use crate::buffer::Buffer;
use crate::constraint::Constraint;
use crate::error::ModelError;
use crate::problem::Problem;
use crate::resource::Resource;
use crate::task::Task;

#[derive(Debug, Default)]
pub struct Workbench {
    problems: Vec<Problem>,
    current: Option<usize>,
}

impl Workbench {
    pub fn new() -> Self {
        Workbench::default()
    }

    /// Create a problem, own it, and make it current. Problem names are
    /// unique within one workbench.
    pub fn create_problem(&mut self, name: impl Into<String>) -> Result<&mut Problem, ModelError> {
        let name = name.into();
        if self.problems.iter().any(|problem| problem.name() == name) {
            return Err(ModelError::DuplicateProblem { name });
        }
        self.problems.push(Problem::new(name));
        let index = self.problems.len() - 1;
        self.current = Some(index);
        Ok(&mut self.problems[index])
    }

    /// Make an owned problem current.
    pub fn activate(&mut self, name: &str) -> Result<(), ModelError> {
        let index = self.index_of(name)?;
        self.current = Some(index);
        Ok(())
    }

    /// Remove an owned problem and return it. If it was current, the slot
    /// empties and later convenience calls fail with `NoActiveProblem`.
    pub fn dispose(&mut self, name: &str) -> Result<Problem, ModelError> {
        let index = self.index_of(name)?;
        let removed = self.problems.remove(index);
        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn problem(&self, name: &str) -> Option<&Problem> {
        self.problems.iter().find(|problem| problem.name() == name)
    }

    pub fn problem_mut(&mut self, name: &str) -> Option<&mut Problem> {
        self.problems
            .iter_mut()
            .find(|problem| problem.name() == name)
    }

    /// The current problem, or `NoActiveProblem` if none was created or
    /// the current one was disposed.
    pub fn current(&self) -> Result<&Problem, ModelError> {
        self.current
            .and_then(|index| self.problems.get(index))
            .ok_or(ModelError::NoActiveProblem)
    }

    pub fn current_mut(&mut self) -> Result<&mut Problem, ModelError> {
        match self.current {
            Some(index) => self
                .problems
                .get_mut(index)
                .ok_or(ModelError::NoActiveProblem),
            None => Err(ModelError::NoActiveProblem),
        }
    }

    /// Register a task into the current problem.
    pub fn add_task(&mut self, task: Task) -> Result<(), ModelError> {
        self.current_mut()?.add_task(task)
    }

    /// Register a resource into the current problem.
    pub fn add_resource(&mut self, resource: impl Into<Resource>) -> Result<(), ModelError> {
        self.current_mut()?.add_resource(resource)
    }

    /// Register a buffer into the current problem.
    pub fn add_buffer(&mut self, buffer: impl Into<Buffer>) -> Result<(), ModelError> {
        self.current_mut()?.add_buffer(buffer)
    }

    /// Register a constraint into the current problem.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        self.current_mut()?.add_constraint(constraint)
    }

    /// Bind a required resource to a task of the current problem.
    pub fn require_resource(
        &mut self,
        task_name: &str,
        resource_name: &str,
    ) -> Result<(), ModelError> {
        self.current_mut()?.require_resource(task_name, resource_name)
    }

    fn index_of(&self, name: &str) -> Result<usize, ModelError> {
        self.problems
            .iter()
            .position(|problem| problem.name() == name)
            .ok_or_else(|| ModelError::UnknownProblem {
                name: name.to_string(),
            })
    }
}
