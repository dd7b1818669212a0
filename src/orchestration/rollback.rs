//! # Rollback Manager
//!
//! Issues compensating pause calls for a completed execution's deployed
//! campaigns. Rollback never deletes the schedule record and never reverts
//! its status; it appends an audit record. Per-platform failures are reported
//! for manual intervention, never auto-retried.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::models::{PlatformRollback, RollbackRecord, RollbackResult};
use crate::platforms::AdapterRegistry;
use crate::state_machine::ScheduleStatus;
use crate::stores::{ConnectionStore, ScheduleStore, StoreError};

#[derive(Debug, Error)]
pub enum RollbackError {
    /// Schedule is not completed or has no rollback data
    #[error("Execution cannot be rolled back")]
    NotEligible,

    #[error("Schedule not found: {0}")]
    ScheduleNotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub struct RollbackManager {
    schedules: Arc<dyn ScheduleStore>,
    connections: Arc<dyn ConnectionStore>,
    adapters: AdapterRegistry,
    clock: SharedClock,
}

impl RollbackManager {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        connections: Arc<dyn ConnectionStore>,
        adapters: AdapterRegistry,
        clock: SharedClock,
    ) -> Self {
        Self {
            schedules,
            connections,
            adapters,
            clock,
        }
    }

    /// Pause every campaign recorded in the schedule's rollback data.
    pub async fn rollback(
        &self,
        schedule_id: Uuid,
        actor: &str,
    ) -> Result<RollbackResult, RollbackError> {
        let mut schedule = self
            .schedules
            .get(schedule_id)
            .await?
            .ok_or(RollbackError::ScheduleNotFound(schedule_id))?;

        if schedule.status != ScheduleStatus::Completed {
            return Err(RollbackError::NotEligible);
        }
        let Some(rollback_data) = schedule.metadata.rollback.clone() else {
            return Err(RollbackError::NotEligible);
        };

        let mut platform_results = Vec::new();
        for platform in &rollback_data.platforms {
            let campaign_ids = rollback_data
                .campaign_ids
                .get(platform)
                .cloned()
                .unwrap_or_default();
            let total = campaign_ids.len() as u32;

            let connection = match self
                .connections
                .connection(&schedule.created_by, *platform)
                .await
            {
                Ok(Some(connection)) => connection,
                Ok(None) => {
                    platform_results.push(PlatformRollback {
                        platform: *platform,
                        campaigns_paused: 0,
                        campaigns_total: total,
                        error: Some(format!(
                            "{} connection not found",
                            platform.display_name()
                        )),
                    });
                    continue;
                }
                Err(e) => {
                    platform_results.push(PlatformRollback {
                        platform: *platform,
                        campaigns_paused: 0,
                        campaigns_total: total,
                        error: Some(format!("Connection lookup failed: {e}")),
                    });
                    continue;
                }
            };

            let Some(adapter) = self.adapters.for_platform(*platform) else {
                platform_results.push(PlatformRollback {
                    platform: *platform,
                    campaigns_paused: 0,
                    campaigns_total: total,
                    error: Some(format!("Unsupported platform: {platform}")),
                });
                continue;
            };

            let mut paused = 0u32;
            let mut first_error = None;
            for campaign_id in &campaign_ids {
                match adapter.pause_campaign(&connection, campaign_id).await {
                    Ok(()) => paused += 1,
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some(e.to_string());
                        }
                    }
                }
            }
            platform_results.push(PlatformRollback {
                platform: *platform,
                campaigns_paused: paused,
                campaigns_total: total,
                error: first_error,
            });
        }

        let requires_manual_intervention: Vec<_> = platform_results
            .iter()
            .filter(|r| !r.fully_paused())
            .map(|r| r.platform)
            .collect();
        let result = RollbackResult {
            rollback_successful: requires_manual_intervention.is_empty(),
            platforms: platform_results,
            requires_manual_intervention: requires_manual_intervention.clone(),
        };

        let now = self.clock.now();
        schedule.metadata.rollback_history.push(RollbackRecord {
            actor: actor.to_string(),
            requested_at: now,
            rollback_successful: result.rollback_successful,
            failed_platforms: requires_manual_intervention.clone(),
        });
        schedule.updated_by = actor.to_string();
        schedule.updated_at = now;
        // Status stays completed; rollback is an audit action, not a state change
        self.schedules.update(&schedule).await?;

        if result.rollback_successful {
            tracing::info!(schedule_id = %schedule_id, actor = actor, "Rollback completed");
        } else {
            tracing::warn!(
                schedule_id = %schedule_id,
                actor = actor,
                failed_platforms = ?requires_manual_intervention,
                "Rollback partially failed; manual intervention required"
            );
        }

        Ok(result)
    }
}
