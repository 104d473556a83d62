//! Error types for model-layer operations.

/// The four entity categories a problem stores.
///
/// Name uniqueness is scoped per category: a task and a worker may share a
/// name, two workers may not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Resource,
    Buffer,
    Constraint,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Resource => "resource",
            EntityKind::Buffer => "buffer",
            EntityKind::Constraint => "constraint",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors arising from entity validation and problem registration.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A workbench convenience call was made with no current problem.
    #[error("no problem is current; create a problem first")]
    NoActiveProblem,

    /// An entity field violates its stated bounds.
    #[error("invalid {entity}: field `{field}` {reason}")]
    InvalidEntity {
        entity: String,
        field: String,
        reason: String,
    },

    /// A second entity with the same name inside one category of one problem.
    #[error("a {kind} named `{name}` is already registered")]
    DuplicateName { kind: EntityKind, name: String },

    /// A reference names an entity the problem has not registered.
    #[error("reference to unknown {kind} `{name}`")]
    DanglingReference { kind: EntityKind, name: String },

    /// A workbench operation named a problem it does not own.
    #[error("no problem named `{name}`")]
    UnknownProblem { name: String },

    /// A second problem with the same name inside one workbench.
    #[error("a problem named `{name}` is already owned")]
    DuplicateProblem { name: String },
}

impl ModelError {
    pub fn invalid(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::InvalidEntity {
            entity: entity.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn dangling(kind: EntityKind, name: impl Into<String>) -> Self {
        ModelError::DanglingReference {
            kind,
            name: name.into(),
        }
    }
}
