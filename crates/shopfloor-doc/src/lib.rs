//! # shopfloor-doc
//!
//! Document layer for scheduling problems.
//!
//! This crate provides:
//! - a type registry mapping document discriminators to entity categories
//! - bidirectional JSON encoding/decoding for entities and whole problems
//! - atomic whole-file document IO
//!
//! It intentionally does not model entities (that is `shopfloor-model`)
//! nor interpret them for solving (`shopfloor-solve`).
//!
//! ## Document shape
//!
//! ```text
//! {"type": "Worker", "name": "W1", "productivity": 1.0, "cost": null}
//!     ↕  encode / decode (references resolve by name)
//! Resource::Worker (registered in a Problem)
//! ```

pub mod codec;
pub mod file;
pub mod registry;

pub use codec::{
    DocumentError, decode_entity, decode_entity_standalone, decode_problem, encode_buffer,
    encode_constraint, encode_entity, encode_problem, encode_resource, encode_task,
    entity_from_str, entity_from_str_standalone, ingest_entity, ingest_entity_str, parse_document,
    problem_from_str, to_compact_string, to_pretty_string,
};
pub use file::{
    DocumentStyle, ingest_entity_file, read_document, read_problem_file, write_document,
    write_entity_file, write_problem_file,
};
pub use registry::{ENTITY_TYPES, PROBLEM_TYPE_NAME, lookup_entity_type, registered_type_names};
