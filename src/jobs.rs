//! # Durable Job Queue Interface
//!
//! Every unit of work (initial execution, retry, monitoring tick,
//! optimization tick) is an independent task dispatched through a durable
//! queue the surrounding application provides. The queue's own retry/discard
//! policy is an outer safety net on top of this crate's business-level retry
//! policy. The monitoring "loop" is a chain of one-shot delayed jobs, never a
//! long-lived process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Priority levels for queue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Critical,
    High,
    Normal,
    Low,
}

impl Default for JobPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Work items this crate dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum ExecutionJob {
    /// Run the execute entry point for a schedule (initial or retry)
    ExecuteSchedule { schedule_id: Uuid },
    /// One monitoring tick over a completed schedule's deployments
    MonitorSchedule { schedule_id: Uuid },
    /// One optimization pass, delayed from completion
    OptimizeSchedule { schedule_id: Uuid },
}

impl ExecutionJob {
    pub fn schedule_id(&self) -> Uuid {
        match self {
            Self::ExecuteSchedule { schedule_id }
            | Self::MonitorSchedule { schedule_id }
            | Self::OptimizeSchedule { schedule_id } => *schedule_id,
        }
    }

    /// Short name used in enqueue logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecuteSchedule { .. } => "execute_schedule",
            Self::MonitorSchedule { .. } => "monitor_schedule",
            Self::OptimizeSchedule { .. } => "optimize_schedule",
        }
    }
}

/// An enqueue request: the job plus dispatch metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub job: ExecutionJob,
    /// When the queue should hand the job to a worker; None = immediately
    pub run_at: Option<DateTime<Utc>>,
    pub priority: JobPriority,
    /// Human-readable reason, recorded by the queue for operators
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

impl JobRequest {
    pub fn new(job: ExecutionJob, requested_at: DateTime<Utc>) -> Self {
        Self {
            job,
            run_at: None,
            priority: JobPriority::default(),
            reason: "ready for processing".to_string(),
            requested_at,
        }
    }

    /// Delay dispatch until a specific instant.
    pub fn with_run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }

    pub fn with_priority(mut self, priority: JobPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn is_delayed(&self) -> bool {
        self.run_at.is_some_and(|at| at > self.requested_at)
    }

    /// When the job should be processed.
    pub fn process_at(&self) -> DateTime<Utc> {
        self.run_at.unwrap_or(self.requested_at)
    }
}

/// Errors from the queue collaborator.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The durable job queue collaborator.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job for immediate or delayed dispatch.
    async fn enqueue(&self, request: JobRequest) -> Result<(), QueueError>;
}
