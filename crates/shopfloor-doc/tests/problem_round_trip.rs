//! Integration tests: encode a fully populated problem and decode it back.
//!
//! The fixture problem exercises every registered document type: all three
//! task duration kinds, plain and cumulative workers, worker selections, a
//! pair of buffers, and one constraint of every kind. Decoding the encoded
//! document must reproduce the problem exactly, and re-encoding the decoded
//! problem must reproduce the document byte for byte.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use shopfloor_doc::{
    DocumentStyle, decode_entity_standalone, decode_problem, encode_problem, encode_resource,
    ingest_entity_str, read_problem_file, to_compact_string, write_problem_file,
};
use shopfloor_model::{
    BoundKind, Constraint, ConstraintDetail, CumulativeWorker, Entity, NonConcurrentBuffer,
    Problem, Resource, SelectWorkers, Task, TaskDuration, TimeInterval, WorkLoadBound, Worker,
};

fn interval(start: u32, end: u32) -> TimeInterval {
    TimeInterval::new(start, end).expect("fixture intervals are ordered")
}

/// One of everything: the widest problem the document layer must carry.
fn full_problem() -> Problem {
    let mut problem = Problem::new("floor_plan");
    problem.set_horizon(Some(24));
    problem.set_start_time(Some(
        DateTime::parse_from_rfc3339("2024-03-01T06:00:00Z")
            .expect("fixture timestamp")
            .with_timezone(&Utc),
    ));
    problem.set_delta_time(Some(TimeDelta::seconds(3600)));

    problem
        .add_buffer(NonConcurrentBuffer::new("B_in", 10))
        .expect("input buffer");
    problem
        .add_buffer(NonConcurrentBuffer::new("B_out", 0))
        .expect("output buffer");

    for name in ["W1", "W2", "W3"] {
        problem.add_resource(Worker::new(name)).expect("worker");
    }
    let all_workers = || vec!["W1".to_string(), "W2".to_string(), "W3".to_string()];
    for name in ["SW1", "SW2", "SW3"] {
        problem
            .add_resource(SelectWorkers::new(name, all_workers()))
            .expect("selection");
    }
    problem
        .add_resource(CumulativeWorker::new("CM1", 3))
        .expect("small machine");
    problem
        .add_resource(CumulativeWorker::new("CM2", 7))
        .expect("large machine");

    problem.add_task(Task::fixed("T_fixed", 3)).expect("fixed task");
    problem.add_task(Task::variable("T_var")).expect("variable task");
    problem.add_task(Task::zero("T_done")).expect("milestone");
    problem.require_resource("T_fixed", "W1").expect("assign W1");
    problem.require_resource("T_fixed", "W2").expect("assign W2");
    problem.require_resource("T_var", "SW1").expect("assign SW1");
    problem.require_resource("T_done", "SW2").expect("assign SW2");

    let constraints = [
        Constraint::named(
            "fixed_before_var",
            ConstraintDetail::TaskPrecedence {
                task_before: "T_fixed".to_string(),
                task_after: "T_var".to_string(),
                offset: 0,
                kind: Default::default(),
            },
        ),
        Constraint::named(
            "pin_start",
            ConstraintDetail::TaskStartAt {
                task: "T_fixed".to_string(),
                value: 5,
            },
        ),
        Constraint::named(
            "drain_input",
            ConstraintDetail::TaskUnloadBuffer {
                task: "T_fixed".to_string(),
                buffer: "B_in".to_string(),
                quantity: 3,
            },
        ),
        Constraint::named(
            "fill_output",
            ConstraintDetail::TaskLoadBuffer {
                task: "T_fixed".to_string(),
                buffer: "B_out".to_string(),
                quantity: 2,
            },
        ),
        Constraint::named(
            "same_crew",
            ConstraintDetail::SameWorkers {
                select_workers_1: "SW1".to_string(),
                select_workers_2: "SW2".to_string(),
            },
        ),
        Constraint::named(
            "split_crews",
            ConstraintDetail::DistinctWorkers {
                select_workers_1: "SW2".to_string(),
                select_workers_2: "SW3".to_string(),
            },
        ),
        Constraint::named(
            "w1_load",
            ConstraintDetail::WorkLoad {
                resource: "W1".to_string(),
                bounds: vec![
                    WorkLoadBound {
                        time_interval: interval(0, 6),
                        bound: 3,
                    },
                    WorkLoadBound {
                        time_interval: interval(19, 24),
                        bound: 4,
                    },
                ],
                kind: BoundKind::Exact,
            },
        ),
        Constraint::named(
            "w1_breaks",
            ConstraintDetail::ResourceUnavailable {
                resource: "W1".to_string(),
                intervals: vec![interval(1, 3), interval(6, 8)],
            },
        ),
        // Left anonymous on purpose: generated names must survive the trip.
        Constraint::anonymous(ConstraintDetail::ResourceTasksDistance {
            resource: "W1".to_string(),
            distance: 4,
            mode: BoundKind::Exact,
            intervals: vec![interval(10, 18)],
        }),
    ];
    for constraint in constraints {
        problem.add_constraint(constraint).expect("constraint");
    }

    problem
}

#[test]
fn fully_populated_problem_round_trips() {
    let problem = full_problem();
    let document = encode_problem(&problem).expect("encode should succeed");
    let decoded = decode_problem(&document).expect("decode should succeed");

    assert_eq!(decoded, problem);
    assert_eq!(decoded.tasks().len(), 3);
    assert_eq!(decoded.resources().len(), 8);
    assert_eq!(decoded.buffers().len(), 2);
    assert_eq!(decoded.constraints().len(), 9);

    let reencoded = encode_problem(&decoded).expect("re-encode should succeed");
    assert_eq!(reencoded, document);
    assert_eq!(to_compact_string(&reencoded), to_compact_string(&document));
}

#[test]
fn encoded_problem_nests_full_documents() {
    let document = encode_problem(&full_problem()).expect("encode should succeed");

    // Tasks carry their required resources as complete nested documents.
    let first_task = &document["tasks"][0];
    assert_eq!(first_task["type"], "FixedDurationTask");
    assert_eq!(first_task["duration"], 3);
    assert_eq!(first_task["required_resources"][0]["type"], "Worker");
    assert_eq!(first_task["required_resources"][0]["name"], "W1");
    assert_eq!(first_task["required_resources"][0]["cost"], Value::Null);

    // Milestones state their zero duration outright.
    assert_eq!(document["tasks"][2]["type"], "ZeroDurationTask");
    assert_eq!(document["tasks"][2]["duration"], 0);

    // Selections expand their candidate lists the same way.
    let selection = &document["resources"][3];
    assert_eq!(selection["type"], "SelectWorkers");
    assert_eq!(selection["nb_workers_to_select"], 1);
    assert_eq!(selection["kind"], "exact");
    let candidates = selection["list_of_workers"]
        .as_array()
        .expect("candidates are an array");
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0]["type"], "Worker");
    assert_eq!(candidates[0]["productivity"], 1.0);

    // Constraint references nest too, and insertion order is preserved.
    let precedence = &document["constraints"][0];
    assert_eq!(precedence["name"], "fixed_before_var");
    assert_eq!(precedence["kind"], "lax");
    assert_eq!(precedence["task_before"]["type"], "FixedDurationTask");
    assert_eq!(precedence["task_after"]["type"], "VariableDurationTask");

    let workload = &document["constraints"][6];
    assert_eq!(workload["resource"]["name"], "W1");
    assert_eq!(workload["time_intervals_and_bounds"][0]["time_interval"][1], 6);
    assert_eq!(workload["time_intervals_and_bounds"][1]["bound"], 4);

    let unavailable = &document["constraints"][7];
    assert_eq!(unavailable["list_of_time_intervals"][1][0], 6);
}

#[test]
fn compact_text_round_trips_into_a_fresh_problem() {
    let mut source = Problem::new("source");
    source.add_task(Task::fixed("T", 3)).expect("task");
    let document = encode_problem(&source).expect("encode should succeed");
    let text = to_compact_string(&document["tasks"][0]);

    let mut target = Problem::new("target");
    let name = ingest_entity_str(&mut target, &text).expect("ingest should succeed");
    assert_eq!(name, "T");

    let task = target.task("T").expect("task was registered");
    assert_eq!(task.duration, TaskDuration::Fixed(3));
    assert!(!task.optional);
    assert_eq!(task.priority, 0);
    assert_eq!(task.work_amount, 0.0);
    assert!(task.required_resources.is_empty());
}

#[test]
fn selection_candidates_decode_standalone_as_workers() {
    let mut problem = Problem::new("crew");
    let mut workers = Vec::new();
    for name in ["W1", "W2", "W3"] {
        let worker = Worker::new(name);
        workers.push(worker.clone());
        problem.add_resource(worker).expect("worker");
    }
    let mut selection = SelectWorkers::new(
        "SW",
        workers.iter().map(|worker| worker.name.clone()).collect(),
    );
    selection.nb_workers_to_select = 2;
    problem.add_resource(selection).expect("selection");

    let resource = problem.resource("SW").expect("selection is registered");
    let document = encode_resource(&problem, resource).expect("encode should succeed");
    let candidates = document["list_of_workers"]
        .as_array()
        .expect("candidates are an array");

    for (candidate, original) in candidates.iter().zip(&workers) {
        let entity = decode_entity_standalone(candidate).expect("candidate decodes alone");
        let Entity::Resource(Resource::Worker(worker)) = entity else {
            panic!("expected a worker, got {entity:?}");
        };
        assert_eq!(&worker, original);
    }
}

#[test]
fn full_problem_survives_a_file_round_trip() {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "shopfloor-round-trip-{}-{unique}.json",
        std::process::id()
    ));

    let problem = full_problem();
    write_problem_file(&path, &problem, DocumentStyle::Pretty).expect("write should succeed");
    let decoded = read_problem_file(&path).expect("read should succeed");
    assert_eq!(decoded, problem);

    let _ = std::fs::remove_file(path);
}
