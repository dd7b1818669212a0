//! # Execution Orchestration
//!
//! The coordination layer: the schedule executor drives one execute trigger
//! through validation, claim, deployment fan-out and finalization; the
//! deployment orchestrator runs the per-platform fan-out; the retry policy
//! decides follow-up attempts; the monitoring loop, rollback manager and
//! notification gate handle what happens after a schedule completes. The
//! service module ties them together behind a single facade.

pub mod deployment_orchestrator;
pub mod monitoring;
pub mod notification;
pub mod retry_policy;
pub mod rollback;
pub mod schedule_executor;
pub mod service;

pub use deployment_orchestrator::DeploymentOrchestrator;
pub use monitoring::MonitoringLoop;
pub use notification::NotificationGate;
pub use retry_policy::RetryPolicy;
pub use rollback::{RollbackError, RollbackManager};
pub use schedule_executor::{
    ExecutionOutcome, ScheduleExecutor, ValidationFailure, OUTSIDE_EXECUTION_WINDOW,
};
pub use service::{CampaignExecutionService, ScheduleRequest};
