//! The problem container: entity registration and reference integrity.
//!
//! A problem owns its entities outright; entities link to each other only
//! by name. Registration is the integrity gate: an entity is validated,
//! checked for name collisions within its category, and has every
//! reference resolved against already-registered entities before it is
//! stored. A rejected entity leaves the problem untouched.

use chrono::{DateTime, TimeDelta, Utc};

use crate::buffer::Buffer;
use crate::constraint::{Constraint, ConstraintDetail};
use crate::error::{EntityKind, ModelError};
use crate::resource::Resource;
use crate::task::Task;

/// Any entity a problem can register, for code generic over categories.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Task(Task),
    Resource(Resource),
    Buffer(Buffer),
    Constraint(Constraint),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Task(_) => EntityKind::Task,
            Entity::Resource(_) => EntityKind::Resource,
            Entity::Buffer(_) => EntityKind::Buffer,
            Entity::Constraint(_) => EntityKind::Constraint,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Task(task) => &task.name,
            Entity::Resource(resource) => resource.name(),
            Entity::Buffer(buffer) => buffer.name(),
            Entity::Constraint(constraint) => &constraint.name,
        }
    }

    /// The document discriminator of the wrapped variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Entity::Task(task) => task.type_name(),
            Entity::Resource(resource) => resource.type_name(),
            Entity::Buffer(buffer) => buffer.type_name(),
            Entity::Constraint(constraint) => constraint.type_name(),
        }
    }

    /// Check the entity's own field invariants, independent of any problem.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Entity::Task(task) => task.validate(),
            Entity::Resource(resource) => resource.validate(),
            Entity::Buffer(buffer) => buffer.validate(),
            Entity::Constraint(constraint) => constraint.validate(),
        }
    }
}

/// A named scheduling problem: four insertion-ordered entity collections
/// plus an optional horizon and calendar anchoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    name: String,
    horizon: Option<u32>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    delta_time: Option<TimeDelta>,
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    buffers: Vec<Buffer>,
    constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new(name: impl Into<String>) -> Self {
        Problem {
            name: name.into(),
            horizon: None,
            start_time: None,
            end_time: None,
            delta_time: None,
            tasks: Vec::new(),
            resources: Vec::new(),
            buffers: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on the timeline, in periods. `None` leaves the horizon
    /// to the solver.
    pub fn horizon(&self) -> Option<u32> {
        self.horizon
    }

    pub fn set_horizon(&mut self, horizon: Option<u32>) {
        self.horizon = horizon;
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn set_start_time(&mut self, start_time: Option<DateTime<Utc>>) {
        self.start_time = start_time;
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn set_end_time(&mut self, end_time: Option<DateTime<Utc>>) {
        self.end_time = end_time;
    }

    /// Real-time length of one schedule period.
    pub fn delta_time(&self) -> Option<TimeDelta> {
        self.delta_time
    }

    pub fn set_delta_time(&mut self, delta_time: Option<TimeDelta>) {
        self.delta_time = delta_time;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.name() == name)
    }

    pub fn buffer(&self, name: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|buffer| buffer.name() == name)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|constraint| constraint.name == name)
    }

    /// Register a task. Its required resources must already be registered.
    pub fn add_task(&mut self, task: Task) -> Result<(), ModelError> {
        task.validate()?;
        if self.task(&task.name).is_some() {
            return Err(ModelError::DuplicateName {
                kind: EntityKind::Task,
                name: task.name.clone(),
            });
        }
        self.verify_task_references(&task)?;
        self.tasks.push(task);
        Ok(())
    }

    /// Register a resource. A selection's candidate workers must already be
    /// registered.
    pub fn add_resource(&mut self, resource: impl Into<Resource>) -> Result<(), ModelError> {
        let resource = resource.into();
        resource.validate()?;
        if self.resource(resource.name()).is_some() {
            return Err(ModelError::DuplicateName {
                kind: EntityKind::Resource,
                name: resource.name().to_string(),
            });
        }
        self.verify_resource_references(&resource)?;
        self.resources.push(resource);
        Ok(())
    }

    pub fn add_buffer(&mut self, buffer: impl Into<Buffer>) -> Result<(), ModelError> {
        let buffer = buffer.into();
        buffer.validate()?;
        if self.buffer(buffer.name()).is_some() {
            return Err(ModelError::DuplicateName {
                kind: EntityKind::Buffer,
                name: buffer.name().to_string(),
            });
        }
        self.buffers.push(buffer);
        Ok(())
    }

    /// Register a constraint. Every entity it references must already be
    /// registered.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        constraint.validate()?;
        if self.constraint(&constraint.name).is_some() {
            return Err(ModelError::DuplicateName {
                kind: EntityKind::Constraint,
                name: constraint.name.clone(),
            });
        }
        self.verify_constraint_references(&constraint)?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Register any entity, dispatching on its category.
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), ModelError> {
        match entity {
            Entity::Task(task) => self.add_task(task),
            Entity::Resource(resource) => self.add_resource(resource),
            Entity::Buffer(buffer) => self.add_buffer(buffer),
            Entity::Constraint(constraint) => self.add_constraint(constraint),
        }
    }

    /// Bind one more required resource to an already-registered task.
    pub fn require_resource(
        &mut self,
        task_name: &str,
        resource_name: &str,
    ) -> Result<(), ModelError> {
        if self.resource(resource_name).is_none() {
            return Err(ModelError::dangling(EntityKind::Resource, resource_name));
        }
        let Some(task) = self.tasks.iter_mut().find(|task| task.name == task_name) else {
            return Err(ModelError::dangling(EntityKind::Task, task_name));
        };
        if task.required_resources.iter().any(|name| name == resource_name) {
            return Err(ModelError::invalid(
                format!("task `{task_name}`"),
                "required_resources",
                format!("resource `{resource_name}` is already required"),
            ));
        }
        task.required_resources.push(resource_name.to_string());
        Ok(())
    }

    /// Resolve every reference the entity holds against this problem,
    /// without registering it.
    pub fn verify_references(&self, entity: &Entity) -> Result<(), ModelError> {
        match entity {
            Entity::Task(task) => self.verify_task_references(task),
            Entity::Resource(resource) => self.verify_resource_references(resource),
            Entity::Buffer(_) => Ok(()),
            Entity::Constraint(constraint) => self.verify_constraint_references(constraint),
        }
    }

    fn verify_task_references(&self, task: &Task) -> Result<(), ModelError> {
        for (index, name) in task.required_resources.iter().enumerate() {
            if self.resource(name).is_none() {
                return Err(ModelError::dangling(EntityKind::Resource, name));
            }
            if task.required_resources[..index].contains(name) {
                return Err(ModelError::invalid(
                    format!("task `{}`", task.name),
                    "required_resources",
                    format!("resource `{name}` is listed twice"),
                ));
            }
        }
        Ok(())
    }

    fn verify_resource_references(&self, resource: &Resource) -> Result<(), ModelError> {
        let Resource::SelectWorkers(select) = resource else {
            return Ok(());
        };
        for name in &select.workers {
            let Some(candidate) = self.resource(name) else {
                return Err(ModelError::dangling(EntityKind::Resource, name));
            };
            if !candidate.is_schedulable() {
                return Err(ModelError::invalid(
                    format!("resource `{}`", select.name),
                    "list_of_workers",
                    format!("`{name}` is a selection, not a schedulable worker"),
                ));
            }
        }
        Ok(())
    }

    fn verify_constraint_references(&self, constraint: &Constraint) -> Result<(), ModelError> {
        let referrer = &constraint.name;
        match &constraint.detail {
            ConstraintDetail::TaskPrecedence {
                task_before,
                task_after,
                ..
            } => {
                self.resolve_task_ref(task_before)?;
                self.resolve_task_ref(task_after)?;
            }
            ConstraintDetail::TaskStartAt { task, .. } => {
                self.resolve_task_ref(task)?;
            }
            ConstraintDetail::TaskLoadBuffer { task, buffer, .. }
            | ConstraintDetail::TaskUnloadBuffer { task, buffer, .. } => {
                self.resolve_task_ref(task)?;
                if self.buffer(buffer).is_none() {
                    return Err(ModelError::dangling(EntityKind::Buffer, buffer));
                }
            }
            ConstraintDetail::SameWorkers {
                select_workers_1,
                select_workers_2,
            }
            | ConstraintDetail::DistinctWorkers {
                select_workers_1,
                select_workers_2,
            } => {
                self.resolve_selection_ref(referrer, select_workers_1)?;
                self.resolve_selection_ref(referrer, select_workers_2)?;
            }
            ConstraintDetail::WorkLoad { resource, .. }
            | ConstraintDetail::ResourceUnavailable { resource, .. }
            | ConstraintDetail::ResourceTasksDistance { resource, .. } => {
                self.resolve_worker_ref(referrer, resource)?;
            }
        }
        Ok(())
    }

    fn resolve_task_ref(&self, name: &str) -> Result<&Task, ModelError> {
        self.task(name)
            .ok_or_else(|| ModelError::dangling(EntityKind::Task, name))
    }

    fn resolve_worker_ref(&self, referrer: &str, name: &str) -> Result<&Resource, ModelError> {
        let resource = self
            .resource(name)
            .ok_or_else(|| ModelError::dangling(EntityKind::Resource, name))?;
        if !resource.is_schedulable() {
            return Err(ModelError::invalid(
                format!("constraint `{referrer}`"),
                "resource",
                format!("`{name}` is a selection, not a schedulable worker"),
            ));
        }
        Ok(resource)
    }

    fn resolve_selection_ref(&self, referrer: &str, name: &str) -> Result<&Resource, ModelError> {
        let resource = self
            .resource(name)
            .ok_or_else(|| ModelError::dangling(EntityKind::Resource, name))?;
        if resource.is_schedulable() {
            return Err(ModelError::invalid(
                format!("constraint `{referrer}`"),
                "select_workers",
                format!("`{name}` is not a SelectWorkers selection"),
            ));
        }
        Ok(resource)
    }
}
