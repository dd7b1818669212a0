//! Ephemeral per-attempt deployment, rollback and monitoring result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::platforms::Platform;

/// Counts of platform sub-objects created beneath a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubObjectCounts {
    pub ad_groups: u32,
    pub ads: u32,
}

/// Outcome of one platform deployment attempt.
///
/// Adapters never throw for platform-level failures; they return
/// `success = false` with a message and the orchestrator aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub platform: Platform,
    pub success: bool,
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub sub_object_counts: SubObjectCounts,
    pub error: Option<String>,
}

impl DeploymentResult {
    pub fn succeeded(
        platform: Platform,
        campaign_id: impl Into<String>,
        sub_object_counts: SubObjectCounts,
    ) -> Self {
        Self {
            platform,
            success: true,
            campaign_id: Some(campaign_id.into()),
            sub_object_counts,
            error: None,
        }
    }

    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            campaign_id: None,
            sub_object_counts: SubObjectCounts::default(),
            error: Some(error.into()),
        }
    }
}

/// Aggregate of all per-platform deployment attempts for one execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub results: Vec<DeploymentResult>,
}

impl DeploymentSummary {
    pub fn new(results: Vec<DeploymentResult>) -> Self {
        Self { results }
    }

    pub fn any_succeeded(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }

    pub fn successes(&self) -> impl Iterator<Item = &DeploymentResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeploymentResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Human-readable summary of every failed platform, for error messages.
    pub fn failure_report(&self) -> String {
        self.failures()
            .map(|r| {
                format!(
                    "{}: {}",
                    r.platform,
                    r.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Minimal record needed to issue compensating pause calls later.
    ///
    /// Present only when at least one platform deployment succeeded.
    pub fn rollback_data(&self) -> Option<RollbackData> {
        let mut campaign_ids: HashMap<Platform, Vec<String>> = HashMap::new();
        for result in self.successes() {
            if let Some(id) = &result.campaign_id {
                campaign_ids
                    .entry(result.platform)
                    .or_default()
                    .push(id.clone());
            }
        }
        if campaign_ids.is_empty() {
            return None;
        }
        let mut platforms: Vec<Platform> = campaign_ids.keys().copied().collect();
        platforms.sort();
        Some(RollbackData {
            platforms,
            campaign_ids,
        })
    }
}

/// Persisted rollback bookkeeping: which platforms got campaigns and their
/// native ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackData {
    pub platforms: Vec<Platform>,
    pub campaign_ids: HashMap<Platform, Vec<String>>,
}

/// Per-platform outcome of a rollback pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRollback {
    pub platform: Platform,
    pub campaigns_paused: u32,
    pub campaigns_total: u32,
    pub error: Option<String>,
}

impl PlatformRollback {
    pub fn fully_paused(&self) -> bool {
        self.error.is_none() && self.campaigns_paused == self.campaigns_total
    }
}

/// Aggregate result of a rollback request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResult {
    pub rollback_successful: bool,
    pub platforms: Vec<PlatformRollback>,
    /// Platforms that could not be fully rolled back and need manual action
    pub requires_manual_intervention: Vec<Platform>,
}

/// Audit entry appended to schedule metadata after each rollback attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackRecord {
    pub actor: String,
    pub requested_at: DateTime<Utc>,
    pub rollback_successful: bool,
    pub failed_platforms: Vec<Platform>,
}

/// One optimization action taken by the monitoring loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub platform: Platform,
    pub timestamp: DateTime<Utc>,
    pub trigger_metric: String,
    pub action_taken: String,
}

/// Point-in-time performance metrics for one deployed campaign.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub impressions: u64,
    pub clicks: u64,
    /// Click-through rate as a fraction (0.015 = 1.5%)
    pub ctr: f64,
    /// Cost per click in minor currency units
    pub cpc_minor_units: i64,
    /// Total spend in minor currency units
    pub spend_minor_units: i64,
}

/// Audit entry recorded when an operator issues an emergency stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyStopRecord {
    pub actor: String,
    pub reason: String,
    pub stopped_at: DateTime<Utc>,
    pub platforms_paused: Vec<Platform>,
}
