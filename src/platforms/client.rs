//! Platform API client boundary.
//!
//! One trait covers all platforms: the adapters build native payloads
//! (objective strings, minor-unit budgets, targeting documents) and the
//! client carries them over the wire. Credentials come from a
//! `PlatformConnection` record owned by the schedule's user; the orchestrator
//! never mutates them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::PerformanceMetrics;
use crate::platforms::Platform;

/// Stored credentials for one (user, platform) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConnection {
    pub id: Uuid,
    pub user_email: String,
    pub platform: Platform,
    pub account_id: String,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Errors surfaced by platform API calls.
#[derive(Debug, Clone, Error)]
pub enum PlatformApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Request rejected: {0}")]
    Validation(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),
}

/// Native top-level campaign payload. Always created paused; a human or
/// downstream automation activates campaigns, never this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    /// Platform-native objective identifier
    pub objective: String,
    /// Daily budget in the platform's native minor-unit convention
    pub daily_budget: i64,
    pub bid_strategy: Option<String>,
    pub paused: bool,
}

/// Native ad set / ad group payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupSpec {
    pub name: String,
    /// Platform-native targeting document; absent fields are omitted
    pub targeting: serde_json::Value,
}

/// Native ad / creative payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSpec {
    pub name: String,
    pub asset: String,
}

/// Inclusive date range for performance queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// API surface of one ad platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Create the top-level campaign object, returning its native id.
    async fn create_campaign(
        &self,
        connection: &PlatformConnection,
        spec: &CampaignSpec,
    ) -> Result<String, PlatformApiError>;

    /// Create an ad set / ad group under a campaign, returning its native id.
    async fn create_ad_group(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        spec: &AdGroupSpec,
    ) -> Result<String, PlatformApiError>;

    /// Create an ad / creative under an ad group, returning its native id.
    async fn create_ad(
        &self,
        connection: &PlatformConnection,
        ad_group_id: &str,
        spec: &AdSpec,
    ) -> Result<String, PlatformApiError>;

    /// Pause (deactivate) a campaign.
    async fn pause_campaign(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
    ) -> Result<(), PlatformApiError>;

    /// Set a campaign's daily budget, in native minor units.
    async fn update_campaign_budget(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        daily_budget: i64,
    ) -> Result<(), PlatformApiError>;

    /// Fetch current performance metrics for a campaign.
    async fn get_performance(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        range: DateRange,
    ) -> Result<PerformanceMetrics, PlatformApiError>;

    /// Verify that the connection's credentials are usable.
    async fn test_connection(&self, connection: &PlatformConnection)
        -> Result<(), PlatformApiError>;
}
