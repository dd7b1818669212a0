use thiserror::Error;

/// Top-level error type for the campaign execution core.
///
/// Business-level failures (validation, deployment, rollback) are modeled as
/// result values on their own types and never surface here; this enum covers
/// the infrastructure-shaped errors that are allowed to propagate past the
/// state machine boundary to the enclosing job queue.
#[derive(Debug, Error)]
pub enum CampaignCoreError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("State transition error: {0}")]
    StateTransition(String),

    #[error("Orchestration error: {0}")]
    Orchestration(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<crate::stores::StoreError> for CampaignCoreError {
    fn from(e: crate::stores::StoreError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<crate::jobs::QueueError> for CampaignCoreError {
    fn from(e: crate::jobs::QueueError) -> Self {
        Self::Queue(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CampaignCoreError>;
