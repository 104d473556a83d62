//! Bidirectional JSON documents for entities and whole problems.
//!
//! Every entity document carries the reserved `type` discriminator plus the
//! full field set of its variant, defaults and nulls included, so a single
//! document is self-contained. Reference fields encode as full nested
//! documents; on decode a reference field accepts either a nested document
//! (its `name` is taken) or a plain name string, and the name is resolved
//! against the target problem's registered entities.
//!
//! Encoding is deterministic: object keys serialize in lexicographic order
//! (`serde_json`'s default map), so `type` sorts like any other key. Compact
//! and pretty renderings parse back to the identical structure.
//!
//! Two decode entry points exist on purpose. `decode_entity` resolves
//! references against a problem and fails on dangling names;
//! `decode_entity_standalone` treats the document as self-contained and
//! keeps references as names, for partial-document workflows.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value, json};
use shopfloor_model::{
    BoundKind, Buffer, Constraint, ConstraintDetail, CumulativeWorker, Entity, EntityKind,
    ModelError, NonConcurrentBuffer, PrecedenceKind, Problem, Resource, SelectWorkers,
    SelectionKind, Task, TaskDuration, TimeInterval, WorkLoadBound, Worker,
};

use crate::registry::{PROBLEM_TYPE_NAME, lookup_entity_type};

/// Errors from document encoding, decoding, and parsing.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File-level failure, reported by the `file` module wrappers.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// The text is not valid JSON.
    #[error("invalid JSON: {message}")]
    Parse { message: String },

    /// The JSON is valid but the document shape is not.
    #[error("malformed document: {message}")]
    Malformed { message: String },

    /// A required field is absent. The field label is a dotted path such as
    /// `tasks[2].duration`.
    #[error("missing field `{field}`")]
    MissingField { field: String },

    /// A present field has the wrong type or an out-of-bounds value.
    #[error("invalid field `{field}` ({message})")]
    InvalidField { field: String, message: String },

    /// The `type` discriminator is not a registered entity type.
    #[error("unknown entity type `{0}`")]
    UnknownEntityType(String),

    /// Model-layer rejection: validation, duplicate name, dangling reference.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Parse document text without interpreting it.
pub fn parse_document(text: &str) -> Result<Value, DocumentError> {
    serde_json::from_str(text).map_err(|error| DocumentError::Parse {
        message: error.to_string(),
    })
}

/// Render with no insignificant whitespace.
pub fn to_compact_string(document: &Value) -> String {
    document.to_string()
}

/// Render indented for human readers.
pub fn to_pretty_string(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a task, expanding its required resources into nested documents
/// resolved from `problem`.
pub fn encode_task(problem: &Problem, task: &Task) -> Result<Value, DocumentError> {
    let mut required = Vec::with_capacity(task.required_resources.len());
    for name in &task.required_resources {
        let resource = problem
            .resource(name)
            .ok_or_else(|| ModelError::dangling(EntityKind::Resource, name))?;
        required.push(encode_resource(problem, resource)?);
    }
    let mut document = json!({
        "type": task.type_name(),
        "name": task.name,
        "optional": task.optional,
        "priority": task.priority,
        "work_amount": task.work_amount,
        "required_resources": required,
    });
    match task.duration {
        TaskDuration::Fixed(length) => document["duration"] = json!(length),
        TaskDuration::Zero => document["duration"] = json!(0),
        TaskDuration::Variable => {}
    }
    Ok(document)
}

/// Encode a resource. A selection's candidate list expands into nested
/// worker documents resolved from `problem`.
pub fn encode_resource(problem: &Problem, resource: &Resource) -> Result<Value, DocumentError> {
    match resource {
        Resource::Worker(worker) => Ok(json!({
            "type": "Worker",
            "name": worker.name,
            "productivity": worker.productivity,
            "cost": worker.cost,
        })),
        Resource::CumulativeWorker(worker) => Ok(json!({
            "type": "CumulativeWorker",
            "name": worker.name,
            "productivity": worker.productivity,
            "cost": worker.cost,
            "size": worker.size,
        })),
        Resource::SelectWorkers(select) => {
            let mut candidates = Vec::with_capacity(select.workers.len());
            for name in &select.workers {
                let worker = problem
                    .resource(name)
                    .ok_or_else(|| ModelError::dangling(EntityKind::Resource, name))?;
                candidates.push(encode_resource(problem, worker)?);
            }
            Ok(json!({
                "type": "SelectWorkers",
                "name": select.name,
                "list_of_workers": candidates,
                "nb_workers_to_select": select.nb_workers_to_select,
                "kind": select.kind.as_str(),
            }))
        }
    }
}

/// Encode a buffer. Buffers hold no references, so this cannot fail.
pub fn encode_buffer(buffer: &Buffer) -> Value {
    let Buffer::NonConcurrent(buffer) = buffer;
    json!({
        "type": "NonConcurrentBuffer",
        "name": buffer.name,
        "initial_state": buffer.initial_state,
        "final_state": buffer.final_state,
        "lower_bound": buffer.lower_bound,
        "upper_bound": buffer.upper_bound,
    })
}

/// Encode a constraint, expanding every referenced entity into a nested
/// document resolved from `problem`.
pub fn encode_constraint(
    problem: &Problem,
    constraint: &Constraint,
) -> Result<Value, DocumentError> {
    let mut fields = Map::new();
    fields.insert("type".to_string(), json!(constraint.type_name()));
    fields.insert("name".to_string(), json!(constraint.name));
    fields.insert("optional".to_string(), json!(constraint.optional));

    match &constraint.detail {
        ConstraintDetail::TaskPrecedence {
            task_before,
            task_after,
            offset,
            kind,
        } => {
            fields.insert(
                "task_before".to_string(),
                encode_task_ref(problem, task_before)?,
            );
            fields.insert(
                "task_after".to_string(),
                encode_task_ref(problem, task_after)?,
            );
            fields.insert("offset".to_string(), json!(offset));
            fields.insert("kind".to_string(), json!(kind.as_str()));
        }
        ConstraintDetail::TaskStartAt { task, value } => {
            fields.insert("task".to_string(), encode_task_ref(problem, task)?);
            fields.insert("value".to_string(), json!(value));
        }
        ConstraintDetail::TaskLoadBuffer {
            task,
            buffer,
            quantity,
        }
        | ConstraintDetail::TaskUnloadBuffer {
            task,
            buffer,
            quantity,
        } => {
            fields.insert("task".to_string(), encode_task_ref(problem, task)?);
            fields.insert("buffer".to_string(), encode_buffer_ref(problem, buffer)?);
            fields.insert("quantity".to_string(), json!(quantity));
        }
        ConstraintDetail::SameWorkers {
            select_workers_1,
            select_workers_2,
        }
        | ConstraintDetail::DistinctWorkers {
            select_workers_1,
            select_workers_2,
        } => {
            fields.insert(
                "select_workers_1".to_string(),
                encode_resource_ref(problem, select_workers_1)?,
            );
            fields.insert(
                "select_workers_2".to_string(),
                encode_resource_ref(problem, select_workers_2)?,
            );
        }
        ConstraintDetail::WorkLoad {
            resource,
            bounds,
            kind,
        } => {
            fields.insert(
                "resource".to_string(),
                encode_resource_ref(problem, resource)?,
            );
            let entries: Vec<Value> = bounds
                .iter()
                .map(|entry| {
                    json!({
                        "time_interval": interval_to_value(entry.time_interval),
                        "bound": entry.bound,
                    })
                })
                .collect();
            fields.insert("time_intervals_and_bounds".to_string(), json!(entries));
            fields.insert("kind".to_string(), json!(kind.as_str()));
        }
        ConstraintDetail::ResourceUnavailable {
            resource,
            intervals,
        } => {
            fields.insert(
                "resource".to_string(),
                encode_resource_ref(problem, resource)?,
            );
            fields.insert(
                "list_of_time_intervals".to_string(),
                intervals_to_value(intervals),
            );
        }
        ConstraintDetail::ResourceTasksDistance {
            resource,
            distance,
            mode,
            intervals,
        } => {
            fields.insert(
                "resource".to_string(),
                encode_resource_ref(problem, resource)?,
            );
            fields.insert("distance".to_string(), json!(distance));
            fields.insert("mode".to_string(), json!(mode.as_str()));
            fields.insert(
                "list_of_time_intervals".to_string(),
                intervals_to_value(intervals),
            );
        }
    }
    Ok(Value::Object(fields))
}

/// Encode a whole problem: shell fields plus one array per entity kind, in
/// insertion order.
pub fn encode_problem(problem: &Problem) -> Result<Value, DocumentError> {
    let mut buffers = Vec::with_capacity(problem.buffers().len());
    for buffer in problem.buffers() {
        buffers.push(encode_buffer(buffer));
    }
    let mut resources = Vec::with_capacity(problem.resources().len());
    for resource in problem.resources() {
        resources.push(encode_resource(problem, resource)?);
    }
    let mut tasks = Vec::with_capacity(problem.tasks().len());
    for task in problem.tasks() {
        tasks.push(encode_task(problem, task)?);
    }
    let mut constraints = Vec::with_capacity(problem.constraints().len());
    for constraint in problem.constraints() {
        constraints.push(encode_constraint(problem, constraint)?);
    }

    Ok(json!({
        "type": PROBLEM_TYPE_NAME,
        "name": problem.name(),
        "horizon": problem.horizon(),
        "start_time": problem.start_time().map(|stamp| stamp.to_rfc3339()),
        "end_time": problem.end_time().map(|stamp| stamp.to_rfc3339()),
        "delta_time": problem.delta_time().map(|delta| delta.num_seconds()),
        "buffers": buffers,
        "resources": resources,
        "tasks": tasks,
        "constraints": constraints,
    }))
}

/// Encode any entity, dispatching on its category.
pub fn encode_entity(problem: &Problem, entity: &Entity) -> Result<Value, DocumentError> {
    match entity {
        Entity::Task(task) => encode_task(problem, task),
        Entity::Resource(resource) => encode_resource(problem, resource),
        Entity::Buffer(buffer) => Ok(encode_buffer(buffer)),
        Entity::Constraint(constraint) => encode_constraint(problem, constraint),
    }
}

fn encode_task_ref(problem: &Problem, name: &str) -> Result<Value, DocumentError> {
    let task = problem
        .task(name)
        .ok_or_else(|| ModelError::dangling(EntityKind::Task, name))?;
    encode_task(problem, task)
}

fn encode_buffer_ref(problem: &Problem, name: &str) -> Result<Value, DocumentError> {
    let buffer = problem
        .buffer(name)
        .ok_or_else(|| ModelError::dangling(EntityKind::Buffer, name))?;
    Ok(encode_buffer(buffer))
}

fn encode_resource_ref(problem: &Problem, name: &str) -> Result<Value, DocumentError> {
    let resource = problem
        .resource(name)
        .ok_or_else(|| ModelError::dangling(EntityKind::Resource, name))?;
    encode_resource(problem, resource)
}

fn interval_to_value(interval: TimeInterval) -> Value {
    json!([interval.start(), interval.end()])
}

fn intervals_to_value(intervals: &[TimeInterval]) -> Value {
    Value::Array(intervals.iter().copied().map(interval_to_value).collect())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode an entity document against a problem: references must resolve to
/// entities the problem has already registered.
pub fn decode_entity(problem: &Problem, document: &Value) -> Result<Entity, DocumentError> {
    let entity = decode_entity_standalone(document)?;
    problem.verify_references(&entity)?;
    Ok(entity)
}

/// Decode an entity document as self-contained: nested reference documents
/// contribute only their names, and nothing is resolved against a problem.
pub fn decode_entity_standalone(document: &Value) -> Result<Entity, DocumentError> {
    let object = document_object(document)?;
    let entity = entity_from_object(object, "")?;
    entity.validate()?;
    Ok(entity)
}

/// Decode and register one entity document into `problem`. On any failure
/// the problem is left exactly as it was. Returns the registered name.
pub fn ingest_entity(problem: &mut Problem, document: &Value) -> Result<String, DocumentError> {
    let entity = decode_entity_standalone(document)?;
    let name = entity.name().to_string();
    problem.add_entity(entity)?;
    Ok(name)
}

/// `ingest_entity` over raw document text.
pub fn ingest_entity_str(problem: &mut Problem, text: &str) -> Result<String, DocumentError> {
    ingest_entity(problem, &parse_document(text)?)
}

/// Decode a whole-problem document. Entity arrays are processed buffers,
/// then resources, then tasks, then constraints, so references resolve
/// against entities registered earlier in the same decode. Any failure
/// discards the partially built problem.
pub fn decode_problem(document: &Value) -> Result<Problem, DocumentError> {
    let object = document_object(document)?;
    let type_name = required_string(object, "type", "")?;
    if type_name != PROBLEM_TYPE_NAME {
        return Err(DocumentError::InvalidField {
            field: "type".to_string(),
            message: format!("expected `{PROBLEM_TYPE_NAME}`, found `{type_name}`"),
        });
    }

    let mut problem = Problem::new(required_string(object, "name", "")?);
    problem.set_horizon(optional_u32(object, "horizon", "")?);
    problem.set_start_time(optional_datetime(object, "start_time", "")?);
    problem.set_end_time(optional_datetime(object, "end_time", "")?);
    if let Some(seconds) = optional_i64(object, "delta_time", "")? {
        if seconds < 1 {
            return Err(DocumentError::InvalidField {
                field: "delta_time".to_string(),
                message: "expected a positive number of seconds".to_string(),
            });
        }
        problem.set_delta_time(Some(TimeDelta::seconds(seconds)));
    }

    for (index, item) in optional_array(object, "buffers", "")?.iter().enumerate() {
        let prefix = format!("buffers[{index}]");
        let buffer = decode_buffer_document(field_object(item, &prefix)?, &prefix)?;
        problem.add_buffer(buffer)?;
    }
    for (index, item) in optional_array(object, "resources", "")?.iter().enumerate() {
        let prefix = format!("resources[{index}]");
        let resource = decode_resource_document(field_object(item, &prefix)?, &prefix)?;
        problem.add_resource(resource)?;
    }
    for (index, item) in optional_array(object, "tasks", "")?.iter().enumerate() {
        let prefix = format!("tasks[{index}]");
        let task = decode_task_document(field_object(item, &prefix)?, &prefix)?;
        problem.add_task(task)?;
    }
    for (index, item) in optional_array(object, "constraints", "")?.iter().enumerate() {
        let prefix = format!("constraints[{index}]");
        let constraint = decode_constraint_document(field_object(item, &prefix)?, &prefix)?;
        problem.add_constraint(constraint)?;
    }

    Ok(problem)
}

/// `decode_entity` over raw document text.
pub fn entity_from_str(problem: &Problem, text: &str) -> Result<Entity, DocumentError> {
    decode_entity(problem, &parse_document(text)?)
}

/// `decode_entity_standalone` over raw document text.
pub fn entity_from_str_standalone(text: &str) -> Result<Entity, DocumentError> {
    decode_entity_standalone(&parse_document(text)?)
}

/// `decode_problem` over raw document text.
pub fn problem_from_str(text: &str) -> Result<Problem, DocumentError> {
    decode_problem(&parse_document(text)?)
}

fn entity_from_object(object: &Map<String, Value>, prefix: &str) -> Result<Entity, DocumentError> {
    let type_name = required_string(object, "type", prefix)?;
    match lookup_entity_type(&type_name) {
        Some(EntityKind::Task) => Ok(Entity::Task(decode_task_document(object, prefix)?)),
        Some(EntityKind::Resource) => {
            Ok(Entity::Resource(decode_resource_document(object, prefix)?))
        }
        Some(EntityKind::Buffer) => Ok(Entity::Buffer(decode_buffer_document(object, prefix)?)),
        Some(EntityKind::Constraint) => {
            Ok(Entity::Constraint(decode_constraint_document(object, prefix)?))
        }
        None => Err(DocumentError::UnknownEntityType(type_name)),
    }
}

fn decode_task_document(
    object: &Map<String, Value>,
    prefix: &str,
) -> Result<Task, DocumentError> {
    let type_name = required_string(object, "type", prefix)?;
    let name = required_string(object, "name", prefix)?;
    let mut task = match type_name.as_str() {
        "FixedDurationTask" => Task::fixed(name, required_u32(object, "duration", prefix)?),
        "ZeroDurationTask" => {
            if let Some(value) = object.get("duration")
                && !value.is_null()
                && value.as_i64() != Some(0)
            {
                return Err(DocumentError::InvalidField {
                    field: join_path(prefix, "duration"),
                    message: "must be 0 for a zero duration task".to_string(),
                });
            }
            Task::zero(name)
        }
        "VariableDurationTask" => Task::variable(name),
        _ => return Err(wrong_category(&type_name, EntityKind::Task, prefix)),
    };
    task.optional = optional_bool(object, "optional", prefix, false)?;
    task.priority = optional_i32_or(object, "priority", prefix, 0)?;
    task.work_amount = optional_f64_or(object, "work_amount", prefix, 0.0)?;
    let label = join_path(prefix, "required_resources");
    for (index, item) in optional_array(object, "required_resources", prefix)?
        .iter()
        .enumerate()
    {
        task.required_resources
            .push(reference_name(item, &format!("{label}[{index}]"))?);
    }
    Ok(task)
}

fn decode_resource_document(
    object: &Map<String, Value>,
    prefix: &str,
) -> Result<Resource, DocumentError> {
    let type_name = required_string(object, "type", prefix)?;
    let name = required_string(object, "name", prefix)?;
    match type_name.as_str() {
        "Worker" => {
            let mut worker = Worker::new(name);
            worker.productivity = optional_f64_or(object, "productivity", prefix, 1.0)?;
            worker.cost = optional_f64(object, "cost", prefix)?;
            Ok(Resource::Worker(worker))
        }
        "CumulativeWorker" => {
            let mut worker = CumulativeWorker::new(name, required_u32(object, "size", prefix)?);
            worker.productivity = optional_f64_or(object, "productivity", prefix, 1.0)?;
            worker.cost = optional_f64(object, "cost", prefix)?;
            Ok(Resource::CumulativeWorker(worker))
        }
        "SelectWorkers" => {
            let label = join_path(prefix, "list_of_workers");
            let items = required_array(object, "list_of_workers", prefix)?;
            let mut workers = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                workers.push(reference_name(item, &format!("{label}[{index}]"))?);
            }
            let mut select = SelectWorkers::new(name, workers);
            select.nb_workers_to_select =
                optional_u32_or(object, "nb_workers_to_select", prefix, 1)? as usize;
            select.kind = selection_kind_field(object, "kind", prefix)?;
            Ok(Resource::SelectWorkers(select))
        }
        _ => Err(wrong_category(&type_name, EntityKind::Resource, prefix)),
    }
}

fn decode_buffer_document(
    object: &Map<String, Value>,
    prefix: &str,
) -> Result<Buffer, DocumentError> {
    let type_name = required_string(object, "type", prefix)?;
    if type_name != "NonConcurrentBuffer" {
        return Err(wrong_category(&type_name, EntityKind::Buffer, prefix));
    }
    let mut buffer = NonConcurrentBuffer::new(
        required_string(object, "name", prefix)?,
        required_i64(object, "initial_state", prefix)?,
    );
    buffer.final_state = optional_i64(object, "final_state", prefix)?;
    buffer.lower_bound = optional_i64(object, "lower_bound", prefix)?;
    buffer.upper_bound = optional_i64(object, "upper_bound", prefix)?;
    Ok(Buffer::NonConcurrent(buffer))
}

fn decode_constraint_document(
    object: &Map<String, Value>,
    prefix: &str,
) -> Result<Constraint, DocumentError> {
    let type_name = required_string(object, "type", prefix)?;
    let detail = match type_name.as_str() {
        "TaskPrecedence" => ConstraintDetail::TaskPrecedence {
            task_before: reference_field(object, "task_before", prefix)?,
            task_after: reference_field(object, "task_after", prefix)?,
            offset: optional_u32_or(object, "offset", prefix, 0)?,
            kind: precedence_kind_field(object, "kind", prefix)?,
        },
        "TaskStartAt" => ConstraintDetail::TaskStartAt {
            task: reference_field(object, "task", prefix)?,
            value: required_u32(object, "value", prefix)?,
        },
        "TaskLoadBuffer" => ConstraintDetail::TaskLoadBuffer {
            task: reference_field(object, "task", prefix)?,
            buffer: reference_field(object, "buffer", prefix)?,
            quantity: required_i64(object, "quantity", prefix)?,
        },
        "TaskUnloadBuffer" => ConstraintDetail::TaskUnloadBuffer {
            task: reference_field(object, "task", prefix)?,
            buffer: reference_field(object, "buffer", prefix)?,
            quantity: required_i64(object, "quantity", prefix)?,
        },
        "SameWorkers" => ConstraintDetail::SameWorkers {
            select_workers_1: reference_field(object, "select_workers_1", prefix)?,
            select_workers_2: reference_field(object, "select_workers_2", prefix)?,
        },
        "DistinctWorkers" => ConstraintDetail::DistinctWorkers {
            select_workers_1: reference_field(object, "select_workers_1", prefix)?,
            select_workers_2: reference_field(object, "select_workers_2", prefix)?,
        },
        "WorkLoad" => ConstraintDetail::WorkLoad {
            resource: reference_field(object, "resource", prefix)?,
            bounds: workload_bounds_field(object, "time_intervals_and_bounds", prefix)?,
            kind: bound_kind_field(object, "kind", prefix, BoundKind::Max)?,
        },
        "ResourceUnavailable" => ConstraintDetail::ResourceUnavailable {
            resource: reference_field(object, "resource", prefix)?,
            intervals: required_intervals(object, "list_of_time_intervals", prefix)?,
        },
        "ResourceTasksDistance" => ConstraintDetail::ResourceTasksDistance {
            resource: reference_field(object, "resource", prefix)?,
            distance: required_u32(object, "distance", prefix)?,
            mode: bound_kind_field(object, "mode", prefix, BoundKind::Exact)?,
            intervals: optional_intervals(object, "list_of_time_intervals", prefix)?,
        },
        _ => return Err(wrong_category(&type_name, EntityKind::Constraint, prefix)),
    };
    let optional = optional_bool(object, "optional", prefix, false)?;
    let mut constraint = match optional_string(object, "name", prefix)? {
        Some(name) => Constraint::named(name, detail),
        None => Constraint::anonymous(detail),
    };
    constraint.optional = optional;
    Ok(constraint)
}

fn wrong_category(type_name: &str, expected: EntityKind, prefix: &str) -> DocumentError {
    match lookup_entity_type(type_name) {
        Some(_) => DocumentError::InvalidField {
            field: join_path(prefix, "type"),
            message: format!("expected a {expected} document, found `{type_name}`"),
        },
        None => DocumentError::UnknownEntityType(type_name.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn document_object(value: &Value) -> Result<&Map<String, Value>, DocumentError> {
    value.as_object().ok_or_else(|| DocumentError::Malformed {
        message: "root must be an object".to_string(),
    })
}

fn field_object<'a>(value: &'a Value, label: &str) -> Result<&'a Map<String, Value>, DocumentError> {
    value.as_object().ok_or_else(|| DocumentError::InvalidField {
        field: label.to_string(),
        message: "expected object".to_string(),
    })
}

fn required_field<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<&'a Value, DocumentError> {
    object.get(field).ok_or_else(|| DocumentError::MissingField {
        field: join_path(prefix, field),
    })
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<String, DocumentError> {
    let label = join_path(prefix, field);
    let Some(raw) = required_field(object, field, prefix)?.as_str() else {
        return Err(DocumentError::InvalidField {
            field: label,
            message: "expected string".to_string(),
        });
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DocumentError::InvalidField {
            field: label,
            message: "must be non-empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Option<String>, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => Ok(Some(required_string(object, field, prefix)?)),
    }
}

fn required_i64(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<i64, DocumentError> {
    required_field(object, field, prefix)?
        .as_i64()
        .ok_or_else(|| DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: "expected an integer".to_string(),
        })
}

fn optional_i64(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Option<i64>, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => Ok(Some(required_i64(object, field, prefix)?)),
    }
}

fn required_u32(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<u32, DocumentError> {
    let raw = required_i64(object, field, prefix)?;
    u32::try_from(raw).map_err(|_| DocumentError::InvalidField {
        field: join_path(prefix, field),
        message: "expected a non-negative integer".to_string(),
    })
}

fn optional_u32(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Option<u32>, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => Ok(Some(required_u32(object, field, prefix)?)),
    }
}

fn optional_u32_or(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    default: u32,
) -> Result<u32, DocumentError> {
    Ok(optional_u32(object, field, prefix)?.unwrap_or(default))
}

fn optional_i32_or(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    default: i32,
) -> Result<i32, DocumentError> {
    match optional_i64(object, field, prefix)? {
        None => Ok(default),
        Some(raw) => i32::try_from(raw).map_err(|_| DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: "expected a 32-bit integer".to_string(),
        }),
    }
}

fn optional_f64(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Option<f64>, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| DocumentError::InvalidField {
                field: join_path(prefix, field),
                message: "expected a number".to_string(),
            }),
    }
}

fn optional_f64_or(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    default: f64,
) -> Result<f64, DocumentError> {
    Ok(optional_f64(object, field, prefix)?.unwrap_or(default))
}

fn optional_bool(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    default: bool,
) -> Result<bool, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value.as_bool().ok_or_else(|| DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: "expected a boolean".to_string(),
        }),
    }
}

fn required_array<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<&'a [Value], DocumentError> {
    required_field(object, field, prefix)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: "expected array".to_string(),
        })
}

fn optional_array<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<&'a [Value], DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(_) => required_array(object, field, prefix),
    }
}

fn optional_datetime(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Option<DateTime<Utc>>, DocumentError> {
    match optional_string(object, field, prefix)? {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|stamp| Some(stamp.with_timezone(&Utc)))
            .map_err(|error| DocumentError::InvalidField {
                field: join_path(prefix, field),
                message: format!("expected an RFC 3339 timestamp ({error})"),
            }),
    }
}

/// A reference field accepts either a plain name string or a nested entity
/// document, in which case its `name` is taken.
fn reference_name(value: &Value, label: &str) -> Result<String, DocumentError> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(DocumentError::InvalidField {
                    field: label.to_string(),
                    message: "must be non-empty".to_string(),
                });
            }
            Ok(trimmed.to_string())
        }
        Value::Object(nested) => required_string(nested, "name", label),
        _ => Err(DocumentError::InvalidField {
            field: label.to_string(),
            message: "expected an entity name or document".to_string(),
        }),
    }
}

fn reference_field(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<String, DocumentError> {
    let label = join_path(prefix, field);
    reference_name(required_field(object, field, prefix)?, &label)
}

fn interval_from_value(value: &Value, label: &str) -> Result<TimeInterval, DocumentError> {
    let Some(pair) = value.as_array() else {
        return Err(DocumentError::InvalidField {
            field: label.to_string(),
            message: "expected a [start, end] pair".to_string(),
        });
    };
    if pair.len() != 2 {
        return Err(DocumentError::InvalidField {
            field: label.to_string(),
            message: "expected exactly two instants".to_string(),
        });
    }
    let endpoint = |value: &Value| -> Option<u32> { value.as_i64().and_then(|n| u32::try_from(n).ok()) };
    let (Some(start), Some(end)) = (endpoint(&pair[0]), endpoint(&pair[1])) else {
        return Err(DocumentError::InvalidField {
            field: label.to_string(),
            message: "instants must be non-negative integers".to_string(),
        });
    };
    TimeInterval::new(start, end).map_err(|error| DocumentError::InvalidField {
        field: label.to_string(),
        message: error.to_string(),
    })
}

fn interval_list(items: &[Value], label: &str) -> Result<Vec<TimeInterval>, DocumentError> {
    let mut intervals = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        intervals.push(interval_from_value(item, &format!("{label}[{index}]"))?);
    }
    Ok(intervals)
}

fn required_intervals(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Vec<TimeInterval>, DocumentError> {
    interval_list(
        required_array(object, field, prefix)?,
        &join_path(prefix, field),
    )
}

fn optional_intervals(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Vec<TimeInterval>, DocumentError> {
    interval_list(
        optional_array(object, field, prefix)?,
        &join_path(prefix, field),
    )
}

fn workload_bounds_field(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<Vec<WorkLoadBound>, DocumentError> {
    let label = join_path(prefix, field);
    let items = required_array(object, field, prefix)?;
    let mut bounds = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let entry_label = format!("{label}[{index}]");
        let entry = field_object(item, &entry_label)?;
        let interval_value =
            entry
                .get("time_interval")
                .ok_or_else(|| DocumentError::MissingField {
                    field: format!("{entry_label}.time_interval"),
                })?;
        let time_interval =
            interval_from_value(interval_value, &format!("{entry_label}.time_interval"))?;
        let bound = required_u32(entry, "bound", &entry_label)?;
        bounds.push(WorkLoadBound {
            time_interval,
            bound,
        });
    }
    Ok(bounds)
}

fn precedence_kind_field(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<PrecedenceKind, DocumentError> {
    match optional_string(object, field, prefix)?.as_deref() {
        None | Some("lax") => Ok(PrecedenceKind::Lax),
        Some("strict") => Ok(PrecedenceKind::Strict),
        Some("tight") => Ok(PrecedenceKind::Tight),
        Some(other) => Err(DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: format!("expected one of lax, strict, tight; found `{other}`"),
        }),
    }
}

fn bound_kind_field(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
    default: BoundKind,
) -> Result<BoundKind, DocumentError> {
    match optional_string(object, field, prefix)?.as_deref() {
        None => Ok(default),
        Some("exact") => Ok(BoundKind::Exact),
        Some("min") => Ok(BoundKind::Min),
        Some("max") => Ok(BoundKind::Max),
        Some(other) => Err(DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: format!("expected one of exact, min, max; found `{other}`"),
        }),
    }
}

fn selection_kind_field(
    object: &Map<String, Value>,
    field: &str,
    prefix: &str,
) -> Result<SelectionKind, DocumentError> {
    match optional_string(object, field, prefix)?.as_deref() {
        None | Some("exact") => Ok(SelectionKind::Exact),
        Some("min") => Ok(SelectionKind::Min),
        Some("max") => Ok(SelectionKind::Max),
        Some(other) => Err(DocumentError::InvalidField {
            field: join_path(prefix, field),
            message: format!("expected one of exact, min, max; found `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_fixture_decodes_standalone() {
        let entity = entity_from_str_standalone(
            r#"{"name": "W2", "type": "Worker", "productivity": 1, "cost": null}"#,
        )
        .expect("worker fixture should decode");
        let Entity::Resource(Resource::Worker(worker)) = entity else {
            panic!("expected a worker, got {entity:?}");
        };
        assert_eq!(worker.name, "W2");
        assert_eq!(worker.productivity, 1.0);
        assert_eq!(worker.cost, None);
    }

    #[test]
    fn worker_encoding_is_deterministic_and_full() {
        let problem = Problem::new("P");
        let document = encode_resource(&problem, &Resource::Worker(Worker::new("W1")))
            .expect("worker should encode");
        assert_eq!(
            to_compact_string(&document),
            r#"{"cost":null,"name":"W1","productivity":1.0,"type":"Worker"}"#
        );
    }

    #[test]
    fn compact_and_pretty_renderings_parse_identically() {
        let problem = Problem::new("P");
        let document = encode_resource(
            &problem,
            &Resource::CumulativeWorker(CumulativeWorker::new("CW1", 3)),
        )
        .expect("cumulative worker should encode");
        let compact = parse_document(&to_compact_string(&document)).expect("compact parses");
        let pretty = parse_document(&to_pretty_string(&document)).expect("pretty parses");
        assert_eq!(compact, pretty);
        assert_eq!(compact, document);
    }

    #[test]
    fn unknown_discriminator_is_a_structured_error() {
        let text =
            r#"{"name": "W2", "type": "ClassThatDoesNotExist", "productivity": 1, "cost": null}"#;
        let err = entity_from_str_standalone(text).expect_err("unregistered type");
        assert!(
            matches!(err, DocumentError::UnknownEntityType(ref name) if name == "ClassThatDoesNotExist")
        );

        // Ingest reports the same error and leaves the target untouched.
        let mut problem = Problem::new("P");
        let err = ingest_entity_str(&mut problem, text).expect_err("unregistered type");
        assert!(matches!(err, DocumentError::UnknownEntityType(_)));
        assert!(problem.resources().is_empty());
    }

    #[test]
    fn task_document_applies_defaults() {
        let entity = decode_entity_standalone(&json!({
            "type": "FixedDurationTask",
            "name": "T_fixed",
            "duration": 3,
        }))
        .expect("task should decode");
        let Entity::Task(task) = entity else {
            panic!("expected a task, got {entity:?}");
        };
        assert_eq!(task.duration, TaskDuration::Fixed(3));
        assert!(!task.optional);
        assert_eq!(task.priority, 0);
        assert_eq!(task.work_amount, 0.0);
        assert!(task.required_resources.is_empty());
    }

    #[test]
    fn zero_duration_task_rejects_other_durations() {
        let err = decode_entity_standalone(&json!({
            "type": "ZeroDurationTask",
            "name": "M",
            "duration": 7,
        }))
        .expect_err("nonzero duration on a milestone");
        assert!(matches!(
            err,
            DocumentError::InvalidField { ref field, .. } if field == "duration"
        ));

        decode_entity_standalone(&json!({
            "type": "ZeroDurationTask",
            "name": "M",
            "duration": 0,
        }))
        .expect("explicit zero is fine");
    }

    #[test]
    fn reference_fields_accept_nested_documents_and_names() {
        let entity = decode_entity_standalone(&json!({
            "type": "SelectWorkers",
            "name": "SW",
            "list_of_workers": [
                {"type": "Worker", "name": "W1", "productivity": 1.0, "cost": null},
                "W2",
            ],
            "nb_workers_to_select": 2,
        }))
        .expect("selection should decode");
        let Entity::Resource(Resource::SelectWorkers(select)) = entity else {
            panic!("expected a selection, got {entity:?}");
        };
        assert_eq!(select.workers, vec!["W1".to_string(), "W2".to_string()]);
        assert_eq!(select.nb_workers_to_select, 2);
        assert_eq!(select.kind, SelectionKind::Exact);
    }

    #[test]
    fn anonymous_constraint_documents_get_generated_names() {
        let entity = decode_entity_standalone(&json!({
            "type": "TaskPrecedence",
            "task_before": "T1",
            "task_after": "T2",
        }))
        .expect("constraint should decode");
        let Entity::Constraint(constraint) = entity else {
            panic!("expected a constraint, got {entity:?}");
        };
        assert!(constraint.name.starts_with("TaskPrecedence_"));
        assert!(matches!(
            constraint.detail,
            ConstraintDetail::TaskPrecedence {
                offset: 0,
                kind: PrecedenceKind::Lax,
                ..
            }
        ));
    }

    #[test]
    fn within_problem_decode_requires_registered_references() {
        let mut problem = Problem::new("P");
        problem.add_task(Task::fixed("T1", 3)).expect("task");

        let document = json!({
            "type": "TaskStartAt",
            "name": "pin",
            "task": "T9",
            "value": 5,
        });
        let err = decode_entity(&problem, &document).expect_err("unknown task");
        assert!(matches!(
            err,
            DocumentError::Model(ModelError::DanglingReference {
                kind: EntityKind::Task,
                ..
            })
        ));

        // The same document decodes standalone, disconnected from any problem.
        decode_entity_standalone(&document).expect("standalone decode ignores references");
    }

    #[test]
    fn ingest_failure_leaves_the_problem_untouched() {
        let mut problem = Problem::new("P");
        ingest_entity_str(
            &mut problem,
            r#"{"name": "W1", "type": "Worker", "productivity": 1, "cost": null}"#,
        )
        .expect("first worker");

        let err = ingest_entity_str(
            &mut problem,
            r#"{"name": "W1", "type": "Worker", "productivity": 2, "cost": null}"#,
        )
        .expect_err("duplicate name");
        assert!(matches!(
            err,
            DocumentError::Model(ModelError::DuplicateName { .. })
        ));
        assert_eq!(problem.resources().len(), 1);
    }

    #[test]
    fn problem_decode_rejects_category_mismatches() {
        let err = decode_problem(&json!({
            "type": PROBLEM_TYPE_NAME,
            "name": "P",
            "tasks": [
                {"type": "Worker", "name": "W1", "productivity": 1.0, "cost": null},
            ],
        }))
        .expect_err("worker in the tasks array");
        assert!(matches!(
            err,
            DocumentError::InvalidField { ref field, .. } if field == "tasks[0].type"
        ));
    }

    #[test]
    fn problem_decode_is_all_or_nothing() {
        let err = decode_problem(&json!({
            "type": PROBLEM_TYPE_NAME,
            "name": "P",
            "resources": [
                {"type": "Worker", "name": "W1", "productivity": 1.0, "cost": null},
            ],
            "constraints": [
                {"type": "ResourceUnavailable", "resource": "W9", "list_of_time_intervals": [[1, 3]]},
            ],
        }))
        .expect_err("dangling resource reference");
        assert!(matches!(
            err,
            DocumentError::Model(ModelError::DanglingReference { .. })
        ));
    }

    #[test]
    fn problem_shell_fields_round_trip() {
        let mut problem = Problem::new("P");
        problem.set_horizon(Some(10));
        problem.set_start_time(Some(
            DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
                .expect("fixture timestamp")
                .with_timezone(&Utc),
        ));
        problem.set_delta_time(Some(TimeDelta::seconds(3600)));

        let document = encode_problem(&problem).expect("problem should encode");
        let decoded = decode_problem(&document).expect("problem should decode");
        assert_eq!(decoded.name(), "P");
        assert_eq!(decoded.horizon(), Some(10));
        assert_eq!(decoded.start_time(), problem.start_time());
        assert_eq!(decoded.end_time(), None);
        assert_eq!(decoded.delta_time(), Some(TimeDelta::seconds(3600)));
    }

    #[test]
    fn delta_time_must_be_positive() {
        let err = decode_problem(&json!({
            "type": PROBLEM_TYPE_NAME,
            "name": "P",
            "delta_time": 0,
        }))
        .expect_err("zero period length");
        assert!(matches!(
            err,
            DocumentError::InvalidField { ref field, .. } if field == "delta_time"
        ));
    }

    #[test]
    fn malformed_documents_are_reported_before_dispatch() {
        let err = problem_from_str("{not json").expect_err("broken text");
        assert!(matches!(err, DocumentError::Parse { .. }));

        let err = decode_entity_standalone(&json!([1, 2, 3])).expect_err("non-object root");
        assert!(matches!(err, DocumentError::Malformed { .. }));
    }

    #[test]
    fn workload_bounds_decode_from_interval_entries() {
        let entity = decode_entity_standalone(&json!({
            "type": "WorkLoad",
            "name": "load_w1",
            "resource": "W1",
            "time_intervals_and_bounds": [
                {"time_interval": [0, 6], "bound": 3},
                {"time_interval": [19, 24], "bound": 4},
            ],
            "kind": "exact",
        }))
        .expect("workload should decode");
        let Entity::Constraint(constraint) = entity else {
            panic!("expected a constraint, got {entity:?}");
        };
        let ConstraintDetail::WorkLoad { bounds, kind, .. } = &constraint.detail else {
            panic!("expected a workload detail");
        };
        assert_eq!(kind, &BoundKind::Exact);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].time_interval.start(), 0);
        assert_eq!(bounds[0].time_interval.end(), 6);
        assert_eq!(bounds[1].bound, 4);
    }

    #[test]
    fn reversed_intervals_are_rejected() {
        let err = decode_entity_standalone(&json!({
            "type": "ResourceUnavailable",
            "name": "off",
            "resource": "W1",
            "list_of_time_intervals": [[8, 6]],
        }))
        .expect_err("start above end");
        assert!(matches!(
            err,
            DocumentError::InvalidField { ref field, .. } if field == "list_of_time_intervals[0]"
        ));
    }
}
