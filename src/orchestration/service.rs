//! # Campaign Execution Service
//!
//! The facade the embedding application talks to. Creation-side operations
//! (schedule, bulk schedule) validate and persist the schedule record and
//! enqueue the delayed execute job; trigger-side operations (execute, monitor,
//! optimize, rollback, emergency stop) delegate to the specialized
//! coordinators.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::CampaignCoreConfig;
use crate::error::{CampaignCoreError, Result};
use crate::jobs::{ExecutionJob, JobQueue, JobRequest};
use crate::models::{
    EmergencyStopRecord, ExecutionRules, ExecutionSchedule, PlatformTarget, RollbackResult,
    ScheduleMetadata,
};
use crate::orchestration::deployment_orchestrator::DeploymentOrchestrator;
use crate::orchestration::monitoring::MonitoringLoop;
use crate::orchestration::notification::NotificationGate;
use crate::orchestration::retry_policy::RetryPolicy;
use crate::orchestration::rollback::{RollbackError, RollbackManager};
use crate::orchestration::schedule_executor::{ExecutionOutcome, ScheduleExecutor};
use crate::platforms::{AdapterRegistry, Platform};
use crate::state_machine::ScheduleStatus;
use crate::stores::{ConnectionStore, NotificationSender, PlanStore, ScheduleStore};

/// Parameters for creating one execution schedule.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub campaign_plan_id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub platform_targets: HashMap<Platform, PlatformTarget>,
    pub execution_rules: ExecutionRules,
    pub priority: i32,
    pub created_by: String,
}

pub struct CampaignExecutionService {
    schedules: Arc<dyn ScheduleStore>,
    plans: Arc<dyn PlanStore>,
    connections: Arc<dyn ConnectionStore>,
    adapters: AdapterRegistry,
    queue: Arc<dyn JobQueue>,
    executor: ScheduleExecutor,
    rollback: RollbackManager,
    monitoring: MonitoringLoop,
    clock: SharedClock,
}

impl CampaignExecutionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        plans: Arc<dyn PlanStore>,
        connections: Arc<dyn ConnectionStore>,
        adapters: AdapterRegistry,
        queue: Arc<dyn JobQueue>,
        notifications: Arc<dyn NotificationSender>,
        config: CampaignCoreConfig,
        clock: SharedClock,
    ) -> Self {
        let orchestrator = DeploymentOrchestrator::new(
            adapters.clone(),
            Arc::clone(&connections),
            config.deployment.clone(),
        );
        let executor = ScheduleExecutor::new(
            Arc::clone(&schedules),
            Arc::clone(&plans),
            orchestrator,
            RetryPolicy::new(config.retry.clone()),
            NotificationGate::new(notifications),
            Arc::clone(&queue),
            config.clone(),
            Arc::clone(&clock),
        );
        let rollback = RollbackManager::new(
            Arc::clone(&schedules),
            Arc::clone(&connections),
            adapters.clone(),
            Arc::clone(&clock),
        );
        let monitoring = MonitoringLoop::new(
            Arc::clone(&schedules),
            Arc::clone(&plans),
            Arc::clone(&connections),
            adapters.clone(),
            Arc::clone(&queue),
            config.monitoring.clone(),
            Arc::clone(&clock),
        );
        Self {
            schedules,
            plans,
            connections,
            adapters,
            queue,
            executor,
            rollback,
            monitoring,
            clock,
        }
    }

    /// Create a schedule record and enqueue its delayed execute job.
    pub async fn schedule_execution(
        &self,
        request: ScheduleRequest,
    ) -> Result<ExecutionSchedule> {
        let now = self.clock.now();
        if request.scheduled_at <= now {
            return Err(CampaignCoreError::Validation(
                "scheduled_at must be in the future".to_string(),
            ));
        }
        if request.platform_targets.is_empty() {
            return Err(CampaignCoreError::Validation(
                "at least one platform target is required".to_string(),
            ));
        }
        if self.plans.get(request.campaign_plan_id).await?.is_none() {
            return Err(CampaignCoreError::Validation(format!(
                "campaign plan not found: {}",
                request.campaign_plan_id
            )));
        }

        let schedule = ExecutionSchedule {
            id: Uuid::new_v4(),
            campaign_plan_id: request.campaign_plan_id,
            name: request.name,
            scheduled_at: request.scheduled_at,
            next_execution_at: None,
            platform_targets: request.platform_targets,
            execution_rules: request.execution_rules,
            status: ScheduleStatus::Scheduled,
            active: true,
            priority: request.priority,
            metadata: ScheduleMetadata::default(),
            created_by: request.created_by.clone(),
            updated_by: request.created_by,
            created_at: now,
            updated_at: now,
        };
        self.schedules.insert(&schedule).await?;

        let job_request = JobRequest::new(
            ExecutionJob::ExecuteSchedule {
                schedule_id: schedule.id,
            },
            now,
        )
        .with_run_at(schedule.scheduled_at)
        .with_reason("scheduled campaign execution");
        self.queue.enqueue(job_request).await?;

        tracing::info!(
            schedule_id = %schedule.id,
            campaign_plan_id = %schedule.campaign_plan_id,
            scheduled_at = %schedule.scheduled_at,
            "Execution scheduled"
        );
        Ok(schedule)
    }

    /// Schedule many executions in one call. Items fail independently; the
    /// result vector is positionally aligned with the input.
    pub async fn bulk_schedule_executions(
        &self,
        requests: Vec<ScheduleRequest>,
    ) -> Vec<Result<ExecutionSchedule>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.schedule_execution(request).await);
        }
        results
    }

    /// Run the execute trigger for a schedule. Called by the queue worker.
    pub async fn execute_schedule(&self, schedule_id: Uuid) -> Result<ExecutionOutcome> {
        self.executor.execute(schedule_id).await
    }

    /// One monitoring tick. Called by the queue worker.
    pub async fn monitor_schedule(&self, schedule_id: Uuid) -> Result<()> {
        self.monitoring.monitor(schedule_id).await
    }

    /// One optimization pass. Called by the queue worker.
    pub async fn optimize_schedule(&self, schedule_id: Uuid) -> Result<()> {
        self.monitoring.optimize(schedule_id).await
    }

    /// Pause every campaign a completed execution deployed.
    pub async fn rollback_execution(
        &self,
        schedule_id: Uuid,
        actor: &str,
    ) -> std::result::Result<RollbackResult, RollbackError> {
        self.rollback.rollback(schedule_id, actor).await
    }

    /// Operator kill switch: pause everything this schedule deployed and
    /// deactivate the schedule so no queued job acts on it again.
    pub async fn emergency_stop(
        &self,
        schedule_id: Uuid,
        actor: &str,
        reason: &str,
    ) -> Result<EmergencyStopRecord> {
        let mut schedule = self
            .schedules
            .get(schedule_id)
            .await?
            .ok_or_else(|| CampaignCoreError::Validation(format!(
                "schedule not found: {schedule_id}"
            )))?;

        let now = self.clock.now();
        let mut platforms_paused = Vec::new();

        if let Some(rollback_data) = schedule.metadata.rollback.clone() {
            for platform in &rollback_data.platforms {
                let Ok(Some(connection)) = self
                    .connections
                    .connection(&schedule.created_by, *platform)
                    .await
                else {
                    tracing::warn!(
                        schedule_id = %schedule_id,
                        platform = %platform,
                        "No usable connection during emergency stop"
                    );
                    continue;
                };
                let Some(adapter) = self.adapters.for_platform(*platform) else {
                    continue;
                };

                let campaign_ids = rollback_data
                    .campaign_ids
                    .get(platform)
                    .cloned()
                    .unwrap_or_default();
                let mut all_paused = true;
                for campaign_id in &campaign_ids {
                    if let Err(e) = adapter.pause_campaign(&connection, campaign_id).await {
                        all_paused = false;
                        tracing::error!(
                            schedule_id = %schedule_id,
                            platform = %platform,
                            campaign_id = %campaign_id,
                            error = %e,
                            "Pause failed during emergency stop"
                        );
                    }
                }
                if all_paused && !campaign_ids.is_empty() {
                    platforms_paused.push(*platform);
                }
            }
        }

        let record = EmergencyStopRecord {
            actor: actor.to_string(),
            reason: reason.to_string(),
            stopped_at: now,
            platforms_paused,
        };
        schedule.active = false;
        schedule.metadata.emergency_stop = Some(record.clone());
        schedule.updated_by = actor.to_string();
        schedule.updated_at = now;
        self.schedules.update(&schedule).await?;

        tracing::warn!(
            schedule_id = %schedule_id,
            actor = actor,
            reason = reason,
            "Emergency stop executed"
        );
        Ok(record)
    }
}
