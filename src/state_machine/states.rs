use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution schedule state definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Waiting for its trigger time (initial state, also retry re-entry)
    Scheduled,
    /// A deployment fan-out is in flight
    Executing,
    /// At least one platform deployment succeeded
    Completed,
    /// Terminal failure, or awaiting a retry decision
    Failed,
}

impl ScheduleStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if this is an active state (a deployment is in flight)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Executing)
    }
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Executing => write!(f, "executing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "executing" => Ok(Self::Executing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid schedule status: {s}")),
        }
    }
}
