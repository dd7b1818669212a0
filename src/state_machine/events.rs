use serde::{Deserialize, Serialize};

/// Events that drive schedule state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ScheduleEvent {
    /// Begin the deployment fan-out
    Start,
    /// Deployment fan-out finished with an acceptable outcome
    Complete,
    /// Deployment fan-out failed, or a permanent validation error was hit
    Fail(String),
    /// Retry policy granted another attempt; re-enters `scheduled`
    Retry,
}

impl ScheduleEvent {
    /// Short name used in transition logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Fail(_) => "fail",
            Self::Retry => "retry",
        }
    }
}
