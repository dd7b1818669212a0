//! The durable record coordinating one campaign go-live attempt.
//!
//! The schedule is mutated exclusively by the state machine (status and
//! metadata) while administrators may edit rules and targets only before
//! execution. Metadata is a single versioned blob for storage but strongly
//! typed in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::models::campaign_plan::{AudienceTargeting, Budget};
use crate::models::deployment::{
    EmergencyStopRecord, OptimizationRecord, RollbackData, RollbackRecord,
};
use crate::platforms::Platform;
use crate::state_machine::ScheduleStatus;

/// Current version of the metadata blob layout.
pub const METADATA_VERSION: u32 = 1;

/// Bid strategy override for one platform target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStrategy {
    LowestCost,
    CostCap,
    TargetCost,
}

/// Per-platform configuration inside a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformTarget {
    /// Daily budget for this platform; overrides the plan's default
    pub daily_budget: Option<Budget>,
    #[serde(default)]
    pub bid_strategy: Option<BidStrategy>,
    /// Targeting overrides merged over the plan's audience by the adapter
    #[serde(default)]
    pub targeting_overrides: Option<AudienceTargeting>,
}

impl Default for PlatformTarget {
    fn default() -> Self {
        Self {
            daily_budget: None,
            bid_strategy: None,
            targeting_overrides: None,
        }
    }
}

fn default_days_of_week() -> BTreeSet<u8> {
    (1..=7).collect()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Time-window and follow-up rules governing when and how a schedule fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRules {
    /// First allowed hour of day (0-23) in `timezone`
    pub start_hour: u8,
    /// First disallowed hour; equal to `start_hour` means a 24h window
    pub end_hour: u8,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// ISO weekday numbers, 1 = Monday .. 7 = Sunday
    #[serde(default = "default_days_of_week")]
    pub days_of_week: BTreeSet<u8>,
    #[serde(default)]
    pub auto_monitor: bool,
    /// Seconds between monitoring ticks; config default applies when unset
    #[serde(default)]
    pub monitoring_interval_seconds: Option<u64>,
    #[serde(default)]
    pub continuous_monitoring: bool,
    #[serde(default)]
    pub auto_optimize: bool,
    /// Seconds after completion before the first optimization tick
    #[serde(default)]
    pub optimization_delay_seconds: Option<u64>,
    /// Defaults to true when unset
    #[serde(default)]
    pub send_notifications: Option<bool>,
    #[serde(default)]
    pub notification_emails: Vec<String>,
    #[serde(default)]
    pub max_consecutive_failures: Option<u32>,
}

impl Default for ExecutionRules {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 0,
            timezone: default_timezone(),
            days_of_week: default_days_of_week(),
            auto_monitor: false,
            monitoring_interval_seconds: None,
            continuous_monitoring: false,
            auto_optimize: false,
            optimization_delay_seconds: None,
            send_notifications: None,
            notification_emails: Vec::new(),
            max_consecutive_failures: None,
        }
    }
}

impl ExecutionRules {
    pub fn notifications_enabled(&self) -> bool {
        self.send_notifications.unwrap_or(true)
    }
}

/// Retry bookkeeping, incremented only on failure-and-retry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryState {
    pub retry_count: u32,
    #[serde(default)]
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// Structured schedule metadata, stored as one versioned blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub version: u32,
    #[serde(default)]
    pub retry: RetryState,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub rescheduled_reason: Option<String>,
    #[serde(default)]
    pub rollback: Option<RollbackData>,
    #[serde(default)]
    pub rollback_history: Vec<RollbackRecord>,
    #[serde(default)]
    pub optimization_history: Vec<OptimizationRecord>,
    #[serde(default)]
    pub emergency_stop: Option<EmergencyStopRecord>,
}

impl Default for ScheduleMetadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION,
            retry: RetryState::default(),
            error_message: None,
            rescheduled_reason: None,
            rollback: None,
            rollback_history: Vec::new(),
            optimization_history: Vec::new(),
            emergency_stop: None,
        }
    }
}

impl ScheduleMetadata {
    /// Serialize into the storage blob form.
    pub fn to_blob(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from the storage blob form.
    pub fn from_blob(blob: &serde_json::Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(blob.clone())?)
    }
}

/// A durable record representing one planned campaign go-live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSchedule {
    pub id: Uuid,
    pub campaign_plan_id: Uuid,
    pub name: String,
    /// Target go-live time set at creation
    pub scheduled_at: DateTime<Utc>,
    /// Recomputed trigger time, set by reschedules and retries
    #[serde(default)]
    pub next_execution_at: Option<DateTime<Utc>>,
    pub platform_targets: HashMap<Platform, PlatformTarget>,
    pub execution_rules: ExecutionRules,
    pub status: ScheduleStatus,
    pub active: bool,
    pub priority: i32,
    #[serde(default)]
    pub metadata: ScheduleMetadata,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionSchedule {
    /// The next trigger time: `next_execution_at` once a reschedule or retry
    /// has moved it, otherwise the original `scheduled_at`.
    pub fn effective_execution_time(&self) -> DateTime<Utc> {
        self.next_execution_at.unwrap_or(self.scheduled_at)
    }

    /// Whether an execute trigger may act on this schedule right now.
    ///
    /// Inactive schedules are never selected; only `scheduled` status is
    /// executable (failed schedules re-enter `scheduled` when retried), and
    /// the trigger time must have arrived.
    pub fn can_be_executed(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.status == ScheduleStatus::Scheduled
            && self.effective_execution_time() <= now
    }

    pub fn retry_count(&self) -> u32 {
        self.metadata.retry.retry_count
    }

    /// Age since creation, used to bound retry eligibility.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    pub fn record_failure(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.metadata.error_message = Some(message.into());
        self.metadata.retry.last_failure_at = Some(now);
    }
}
