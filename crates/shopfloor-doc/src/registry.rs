//! Discriminator registry: the closed set of document type names.
//!
//! Decoding dispatches on the reserved `type` field. The table below is the
//! single authority mapping each discriminator to its entity category; the
//! per-category decoders in `codec` match exhaustively on the names listed
//! here, so adding a variant means touching both.

use shopfloor_model::EntityKind;

/// Discriminator of a whole-problem document. Not an entity type.
pub const PROBLEM_TYPE_NAME: &str = "SchedulingProblem";

/// Every registered entity discriminator and its category.
pub const ENTITY_TYPES: &[(&str, EntityKind)] = &[
    ("FixedDurationTask", EntityKind::Task),
    ("ZeroDurationTask", EntityKind::Task),
    ("VariableDurationTask", EntityKind::Task),
    ("Worker", EntityKind::Resource),
    ("CumulativeWorker", EntityKind::Resource),
    ("SelectWorkers", EntityKind::Resource),
    ("NonConcurrentBuffer", EntityKind::Buffer),
    ("TaskPrecedence", EntityKind::Constraint),
    ("TaskStartAt", EntityKind::Constraint),
    ("TaskLoadBuffer", EntityKind::Constraint),
    ("TaskUnloadBuffer", EntityKind::Constraint),
    ("SameWorkers", EntityKind::Constraint),
    ("DistinctWorkers", EntityKind::Constraint),
    ("WorkLoad", EntityKind::Constraint),
    ("ResourceUnavailable", EntityKind::Constraint),
    ("ResourceTasksDistance", EntityKind::Constraint),
];

/// The category registered for a discriminator, or `None` if unregistered.
pub fn lookup_entity_type(type_name: &str) -> Option<EntityKind> {
    ENTITY_TYPES
        .iter()
        .find_map(|(name, kind)| (*name == type_name).then_some(*kind))
}

/// All registered discriminators, in registration order.
pub fn registered_type_names() -> impl Iterator<Item = &'static str> {
    ENTITY_TYPES.iter().map(|(name, _)| *name)
}
