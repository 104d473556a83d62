//! Solver configuration, carried under the same document rules as entities:
//! a `type` discriminator, every field present on encode, defaults applied
//! on decode.

use serde_json::{Value, json};

use crate::solver::SolverError;

pub const SOLVER_CONFIG_TYPE_NAME: &str = "SolverConfig";

/// Knobs every backend understands. Backend-specific tuning belongs to the
/// backend's own adapter, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget in seconds. `None` means unlimited.
    pub max_time_seconds: Option<u64>,
    /// Let the backend diversify otherwise-arbitrary choices.
    pub random_values: bool,
}

/// Encode with every field present, nulls included.
pub fn encode_config(config: &SolverConfig) -> Value {
    json!({
        "type": SOLVER_CONFIG_TYPE_NAME,
        "max_time_seconds": config.max_time_seconds,
        "random_values": config.random_values,
    })
}

/// Decode a configuration document, applying defaults for absent fields.
pub fn decode_config(document: &Value) -> Result<SolverConfig, SolverError> {
    let Some(object) = document.as_object() else {
        return Err(invalid("document", "must be an object"));
    };
    match object.get("type").and_then(Value::as_str) {
        Some(SOLVER_CONFIG_TYPE_NAME) => {}
        Some(other) => {
            return Err(invalid(
                "type",
                format!("expected `{SOLVER_CONFIG_TYPE_NAME}`, found `{other}`"),
            ));
        }
        None => return Err(invalid("type", "must be a string")),
    }

    let max_time_seconds = match object.get("max_time_seconds") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .ok_or_else(|| invalid("max_time_seconds", "expected a non-negative integer"))?,
        ),
    };
    let random_values = match object.get("random_values") {
        None | Some(Value::Null) => false,
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid("random_values", "expected a boolean"))?,
    };

    Ok(SolverConfig {
        max_time_seconds,
        random_values,
    })
}

fn invalid(field: &str, message: impl Into<String>) -> SolverError {
    SolverError::Config {
        field: field.to_string(),
        message: message.into(),
    }
}
