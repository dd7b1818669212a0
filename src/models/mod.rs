//! Data layer for the campaign execution core.
//!
//! `ExecutionSchedule` is the only record this crate owns and mutates;
//! `CampaignPlan` is a consumed view of the planning layer's record, and the
//! deployment types are ephemeral per-attempt results.

pub mod campaign_plan;
pub mod deployment;
pub mod execution_schedule;

pub use campaign_plan::{
    ApprovalStatus, AudienceTargeting, Budget, BudgetParseError, CampaignObjective, CampaignPlan,
    GeneratedContent,
};
pub use deployment::{
    DeploymentResult, DeploymentSummary, EmergencyStopRecord, OptimizationRecord,
    PerformanceMetrics, PlatformRollback, RollbackData, RollbackRecord, RollbackResult,
    SubObjectCounts,
};
pub use execution_schedule::{
    BidStrategy, ExecutionRules, ExecutionSchedule, PlatformTarget, RetryState, ScheduleMetadata,
    METADATA_VERSION,
};
