//! Collaborator interfaces for the durable stores and the mail sender.
//!
//! Persistence technology is the embedding application's choice; this crate
//! only requires the operations below. The schedule record is always mutated
//! as a single read-modify-write unit per task, and `begin_execution` is the
//! store-level guard that keeps two concurrent execute triggers from both
//! entering the deployment fan-out.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CampaignPlan, ExecutionSchedule};
use crate::platforms::{Platform, PlatformConnection};

/// Errors from a durable store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable store for `ExecutionSchedule` records.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ExecutionSchedule>, StoreError>;

    /// Persist a newly created schedule record.
    async fn insert(&self, schedule: &ExecutionSchedule) -> Result<(), StoreError>;

    /// Persist the full record as one read-modify-write unit.
    async fn update(&self, schedule: &ExecutionSchedule) -> Result<(), StoreError>;

    /// Atomically flip `scheduled → executing`. Returns false when the record
    /// is no longer in `scheduled` status (another trigger won the race), in
    /// which case the caller must not proceed.
    async fn begin_execution(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Read/write access to the planning layer's CampaignPlan records.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<CampaignPlan>, StoreError>;

    /// Persist execution timestamps and the schedule back-reference.
    async fn update(&self, plan: &CampaignPlan) -> Result<(), StoreError>;
}

/// Resolves platform credentials, keyed by (user, platform). Read-only.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn connection(
        &self,
        user_email: &str,
        platform: Platform,
    ) -> Result<Option<PlatformConnection>, StoreError>;
}

/// Errors from the notification collaborator.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// External mail/notification sender. The gate decides whether and to whom;
/// delivery is this collaborator's problem.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        recipients: &[String],
        template: &str,
        data: serde_json::Value,
    ) -> Result<(), NotificationError>;
}
