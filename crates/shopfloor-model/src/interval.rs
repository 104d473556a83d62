//! Closed time intervals on the integer schedule timeline.

use crate::error::ModelError;

/// A closed interval `[start, end]` of schedule instants, with
/// `start <= end`. Serializes as a two-element array.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct TimeInterval {
    start: u32,
    end: u32,
}

impl TimeInterval {
    /// Build an interval, rejecting `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::invalid(
                "time interval",
                "start",
                format!("must not exceed end ({start} > {end})"),
            ));
        }
        Ok(TimeInterval { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of schedule periods the interval spans.
    pub fn length(&self) -> u32 {
        self.end - self.start
    }
}

impl TryFrom<(u32, u32)> for TimeInterval {
    type Error = ModelError;

    fn try_from(pair: (u32, u32)) -> Result<Self, Self::Error> {
        TimeInterval::new(pair.0, pair.1)
    }
}

impl From<TimeInterval> for (u32, u32) {
    fn from(interval: TimeInterval) -> Self {
        (interval.start, interval.end)
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
