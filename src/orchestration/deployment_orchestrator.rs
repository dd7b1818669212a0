//! # Deployment Orchestrator
//!
//! Fans one execution out to every configured platform and aggregates the
//! per-platform results. A missing connection fails only that platform;
//! platforms that are connected still deploy. Each platform call runs under a
//! bounded timeout, and a timeout is treated like any other deployment
//! failure. Once a platform call is initiated it is never aborted mid-flight;
//! the timeout abandons waiting, the call completes or fails on its own terms.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DeploymentConfig;
use crate::models::{CampaignPlan, DeploymentResult, DeploymentSummary, ExecutionSchedule};
use crate::platforms::{AdapterRegistry, DeploymentContext, Platform};
use crate::stores::ConnectionStore;

pub struct DeploymentOrchestrator {
    adapters: AdapterRegistry,
    connections: Arc<dyn ConnectionStore>,
    config: DeploymentConfig,
}

impl DeploymentOrchestrator {
    pub fn new(
        adapters: AdapterRegistry,
        connections: Arc<dyn ConnectionStore>,
        config: DeploymentConfig,
    ) -> Self {
        Self {
            adapters,
            connections,
            config,
        }
    }

    /// Deploy to every platform in the schedule's target map, in parallel.
    pub async fn deploy_all(
        &self,
        schedule: &ExecutionSchedule,
        plan: &CampaignPlan,
    ) -> DeploymentSummary {
        let mut platforms: Vec<Platform> = schedule.platform_targets.keys().copied().collect();
        platforms.sort();

        let attempts = platforms
            .iter()
            .map(|platform| self.deploy_one(schedule, plan, *platform));
        let mut results: Vec<DeploymentResult> = futures::future::join_all(attempts).await;
        // join_all preserves input order; keep it deterministic for callers
        results.sort_by_key(|r| r.platform);

        let summary = DeploymentSummary::new(results);
        for failure in summary.failures() {
            tracing::warn!(
                schedule_id = %schedule.id,
                platform = %failure.platform,
                error = failure.error.as_deref().unwrap_or("unknown"),
                "Platform deployment failed"
            );
        }
        summary
    }

    async fn deploy_one(
        &self,
        schedule: &ExecutionSchedule,
        plan: &CampaignPlan,
        platform: Platform,
    ) -> DeploymentResult {
        let Some(target) = schedule.platform_targets.get(&platform) else {
            return DeploymentResult::failed(platform, "Platform target missing");
        };

        let connection = match self
            .connections
            .connection(&schedule.created_by, platform)
            .await
        {
            Ok(Some(connection)) => connection,
            Ok(None) => {
                return DeploymentResult::failed(
                    platform,
                    format!("{} connection not found", platform.display_name()),
                )
            }
            Err(e) => {
                return DeploymentResult::failed(
                    platform,
                    format!("Connection lookup failed: {e}"),
                )
            }
        };

        let Some(adapter) = self.adapters.for_platform(platform) else {
            return DeploymentResult::failed(platform, format!("Unsupported platform: {platform}"));
        };

        let ctx = DeploymentContext {
            schedule_id: schedule.id,
            schedule_name: &schedule.name,
            plan,
            target,
            connection: &connection,
        };

        let timeout = Duration::from_secs(self.config.platform_call_timeout_seconds);
        match tokio::time::timeout(timeout, adapter.deploy(&ctx)).await {
            Ok(result) => result,
            Err(_) => DeploymentResult::failed(
                platform,
                format!(
                    "Deployment timed out after {}s",
                    self.config.platform_call_timeout_seconds
                ),
            ),
        }
    }
}
