//! # Monitoring & Optimization Loop
//!
//! Periodically polls per-platform performance for a completed schedule and
//! adjusts budgets when a metric breaches its threshold. The "loop" is a
//! chain of one-shot delayed jobs: each tick re-enqueues the next one only
//! while continuous monitoring is configured, so a crashed worker loses at
//! most one unscheduled tick. A tick against a schedule that is no longer
//! running (completed its plan run, or rolled back concurrently) is a silent
//! no-op.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::MonitoringConfig;
use crate::error::Result;
use crate::jobs::{ExecutionJob, JobQueue, JobRequest};
use crate::models::{Budget, ExecutionSchedule, OptimizationRecord, PerformanceMetrics};
use crate::platforms::{AdapterRegistry, DateRange, Platform};
use crate::state_machine::ScheduleStatus;
use crate::stores::{ConnectionStore, PlanStore, ScheduleStore};

pub struct MonitoringLoop {
    schedules: Arc<dyn ScheduleStore>,
    plans: Arc<dyn PlanStore>,
    connections: Arc<dyn ConnectionStore>,
    adapters: AdapterRegistry,
    queue: Arc<dyn JobQueue>,
    config: MonitoringConfig,
    clock: SharedClock,
}

impl MonitoringLoop {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        plans: Arc<dyn PlanStore>,
        connections: Arc<dyn ConnectionStore>,
        adapters: AdapterRegistry,
        queue: Arc<dyn JobQueue>,
        config: MonitoringConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            schedules,
            plans,
            connections,
            adapters,
            queue,
            config,
            clock,
        }
    }

    /// One monitoring tick. Re-enqueues itself when the schedule's rules ask
    /// for continuous monitoring.
    pub async fn monitor(&self, schedule_id: Uuid) -> Result<()> {
        let reenqueue = self.run_tick(schedule_id, "monitoring tick").await?;

        if reenqueue {
            let now = self.clock.now();
            let interval = self.interval_for(schedule_id).await?;
            let request = JobRequest::new(ExecutionJob::MonitorSchedule { schedule_id }, now)
                .with_run_at(now + Duration::seconds(interval as i64))
                .with_reason("continuous monitoring");
            self.queue.enqueue(request).await?;
        }
        Ok(())
    }

    /// One optimization pass, dispatched at `optimization_delay` after a
    /// successful execution. Same threshold check as a monitoring tick but
    /// never re-enqueues.
    pub async fn optimize(&self, schedule_id: Uuid) -> Result<()> {
        self.run_tick(schedule_id, "optimization pass").await?;
        Ok(())
    }

    async fn interval_for(&self, schedule_id: Uuid) -> Result<u64> {
        let interval = self
            .schedules
            .get(schedule_id)
            .await?
            .and_then(|s| s.execution_rules.monitoring_interval_seconds)
            .unwrap_or(self.config.default_interval_seconds);
        Ok(interval)
    }

    /// Returns whether a follow-up tick should be enqueued.
    async fn run_tick(&self, schedule_id: Uuid, context: &str) -> Result<bool> {
        let Some(mut schedule) = self.schedules.get(schedule_id).await? else {
            tracing::info!(schedule_id = %schedule_id, "Schedule gone; skipping {context}");
            return Ok(false);
        };
        if schedule.status != ScheduleStatus::Completed {
            tracing::debug!(schedule_id = %schedule_id, status = %schedule.status,
                "Schedule not in a monitorable state; skipping {context}");
            return Ok(false);
        }
        // Emergency stop deactivates the schedule; stale queued ticks must
        // not touch campaigns the operator just paused
        if !schedule.active {
            tracing::debug!(schedule_id = %schedule_id, "Schedule deactivated; skipping {context}");
            return Ok(false);
        }
        if !schedule.metadata.rollback_history.is_empty() {
            tracing::debug!(schedule_id = %schedule_id,
                "Deployments were rolled back; skipping {context}");
            return Ok(false);
        }
        let Some(plan) = self.plans.get(schedule.campaign_plan_id).await? else {
            return Ok(false);
        };
        if !plan.execution_active() {
            tracing::debug!(schedule_id = %schedule_id, "Plan run closed; skipping {context}");
            return Ok(false);
        }
        let Some(rollback_data) = schedule.metadata.rollback.clone() else {
            return Ok(false);
        };

        let now = self.clock.now();
        let range = DateRange {
            from: now - Duration::hours(24),
            to: now,
        };

        let mut new_records = Vec::new();
        for platform in &rollback_data.platforms {
            let Ok(Some(connection)) = self
                .connections
                .connection(&schedule.created_by, *platform)
                .await
            else {
                tracing::warn!(schedule_id = %schedule_id, platform = %platform,
                    "No usable connection; skipping platform in {context}");
                continue;
            };
            let Some(adapter) = self.adapters.for_platform(*platform) else {
                continue;
            };

            let budget = self.budget_for(&schedule, &plan, *platform);
            let campaign_ids = rollback_data
                .campaign_ids
                .get(platform)
                .cloned()
                .unwrap_or_default();

            for campaign_id in &campaign_ids {
                let metrics = match adapter
                    .fetch_performance(&connection, campaign_id, range)
                    .await
                {
                    Ok(metrics) => metrics,
                    Err(e) => {
                        tracing::warn!(schedule_id = %schedule_id, platform = %platform,
                            campaign_id = %campaign_id, error = %e,
                            "Performance fetch failed");
                        continue;
                    }
                };

                let Some(trigger) = self.breached_metric(&metrics) else {
                    continue;
                };

                match adapter
                    .apply_optimization(&connection, campaign_id, budget)
                    .await
                {
                    Ok(action) => {
                        tracing::info!(schedule_id = %schedule_id, platform = %platform,
                            campaign_id = %campaign_id, trigger = %trigger, action = %action,
                            "Applied optimization");
                        new_records.push(OptimizationRecord {
                            platform: *platform,
                            timestamp: now,
                            trigger_metric: trigger,
                            action_taken: action,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(schedule_id = %schedule_id, platform = %platform,
                            campaign_id = %campaign_id, error = %e,
                            "Optimization call failed");
                    }
                }
            }
        }

        if !new_records.is_empty() {
            schedule.metadata.optimization_history.extend(new_records);
            schedule.updated_at = now;
            self.schedules.update(&schedule).await?;
        }

        Ok(schedule.execution_rules.continuous_monitoring)
    }

    fn budget_for(
        &self,
        schedule: &ExecutionSchedule,
        plan: &crate::models::CampaignPlan,
        platform: Platform,
    ) -> Budget {
        schedule
            .platform_targets
            .get(&platform)
            .and_then(|t| t.daily_budget)
            .unwrap_or(plan.daily_budget)
    }

    /// Name of the breached metric, if any.
    fn breached_metric(&self, metrics: &PerformanceMetrics) -> Option<String> {
        if metrics.impressions > 0 && metrics.ctr < self.config.ctr_floor {
            return Some(format!("ctr_below_{}", self.config.ctr_floor));
        }
        if metrics.clicks > 0 && metrics.cpc_minor_units > self.config.cpc_ceiling_minor_units {
            return Some(format!("cpc_above_{}", self.config.cpc_ceiling_minor_units));
        }
        None
    }
}
