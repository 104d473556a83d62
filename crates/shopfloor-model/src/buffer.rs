//! Buffers: stateful stores that tasks load into and unload from.

use crate::error::ModelError;

/// A buffer no two tasks may access at the same instant.
///
/// State is counted in integral units. `final_state` and the bounds are
/// solver-side requirements; only `initial_state` is mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct NonConcurrentBuffer {
    pub name: String,
    pub initial_state: i64,
    pub final_state: Option<i64>,
    pub lower_bound: Option<i64>,
    pub upper_bound: Option<i64>,
}

impl NonConcurrentBuffer {
    pub fn new(name: impl Into<String>, initial_state: i64) -> Self {
        NonConcurrentBuffer {
            name: name.into(),
            initial_state,
            final_state: None,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

/// The closed set of buffer variants a problem can register.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    NonConcurrent(NonConcurrentBuffer),
}

impl Buffer {
    pub fn name(&self) -> &str {
        match self {
            Buffer::NonConcurrent(buffer) => &buffer.name,
        }
    }

    /// The document discriminator for this buffer's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Buffer::NonConcurrent(_) => "NonConcurrentBuffer",
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let Buffer::NonConcurrent(buffer) = self;
        let label = format!("buffer `{}`", buffer.name);
        if buffer.name.is_empty() {
            return Err(ModelError::invalid(label, "name", "must be non-empty"));
        }
        if let (Some(lower), Some(upper)) = (buffer.lower_bound, buffer.upper_bound) {
            if lower > upper {
                return Err(ModelError::invalid(
                    label,
                    "lower_bound",
                    format!("must not exceed upper_bound ({lower} > {upper})"),
                ));
            }
        }
        if let Some(lower) = buffer.lower_bound {
            if buffer.initial_state < lower {
                return Err(ModelError::invalid(
                    label,
                    "initial_state",
                    format!("must not fall below lower_bound ({lower})"),
                ));
            }
        }
        if let Some(upper) = buffer.upper_bound {
            if buffer.initial_state > upper {
                return Err(ModelError::invalid(
                    label,
                    "initial_state",
                    format!("must not exceed upper_bound ({upper})"),
                ));
            }
        }
        Ok(())
    }
}

impl From<NonConcurrentBuffer> for Buffer {
    fn from(buffer: NonConcurrentBuffer) -> Self {
        Buffer::NonConcurrent(buffer)
    }
}
