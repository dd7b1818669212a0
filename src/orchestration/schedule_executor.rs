//! # Schedule Executor
//!
//! Top-level coordinator for one execute trigger. Owns the lifecycle of the
//! `ExecutionSchedule` record: precondition validation, execution-window
//! gating, the `scheduled → executing` claim, deployment fan-out,
//! finalization, retry decisions and terminal notifications.
//!
//! Business-level failures never propagate past this boundary; only genuine
//! infrastructure errors (store/serialization) are re-raised so the enclosing
//! durable job queue can apply its own outer retry policy. Before re-raising,
//! the schedule is marked failed so no record is ever left `executing`
//! indefinitely.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::CampaignCoreConfig;
use crate::error::{CampaignCoreError, Result};
use crate::jobs::{ExecutionJob, JobQueue, JobPriority, JobRequest};
use crate::models::{CampaignPlan, DeploymentSummary, ExecutionSchedule};
use crate::orchestration::deployment_orchestrator::DeploymentOrchestrator;
use crate::orchestration::notification::NotificationGate;
use crate::orchestration::retry_policy::RetryPolicy;
use crate::state_machine::{ScheduleEvent, ScheduleStateMachine, ScheduleStatus};
use crate::stores::{PlanStore, ScheduleStore};
use crate::window::{self, WindowError};

/// Reason a reschedule was recorded instead of a deployment.
pub const OUTSIDE_EXECUTION_WINDOW: &str = "outside_execution_window";

/// A single precondition validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    PlanNotFound,
    PlanNotApproved { current: String },
    MissingContent { artifacts: Vec<String> },
    OutsideExecutionWindow,
    InvalidWindowRules { detail: String },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlanNotFound => write!(f, "Campaign plan not found"),
            Self::PlanNotApproved { current } => {
                write!(f, "Campaign plan is not approved (current: {current})")
            }
            Self::MissingContent { artifacts } => {
                write!(f, "Plan content incomplete: missing {}", artifacts.join(", "))
            }
            Self::OutsideExecutionWindow => write!(f, "Outside execution window"),
            Self::InvalidWindowRules { detail } => {
                write!(f, "Invalid execution window rules: {detail}")
            }
        }
    }
}

/// What one execute trigger did.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Schedule was deleted concurrently; logged, not an error
    ScheduleGone,
    /// Inactive, wrong status, or not yet due; nothing mutated
    NotEligible,
    /// Another trigger claimed the schedule first
    AlreadyClaimed,
    /// Only blocker was the execution window; trigger time moved forward
    Rescheduled { next_execution_at: DateTime<Utc> },
    /// Permanent misconfiguration; terminally failed without deployment
    ValidationFailed { failures: Vec<ValidationFailure> },
    /// Deployment accepted; schedule completed
    Completed { summary: DeploymentSummary },
    /// Deployment failed; another attempt is scheduled
    FailedWillRetry { next_execution_at: DateTime<Utc> },
    /// Deployment failed; retries exhausted or schedule too old
    FailedTerminally { error: String },
}

pub struct ScheduleExecutor {
    schedules: Arc<dyn ScheduleStore>,
    plans: Arc<dyn PlanStore>,
    orchestrator: DeploymentOrchestrator,
    retry_policy: RetryPolicy,
    notifications: NotificationGate,
    queue: Arc<dyn JobQueue>,
    config: CampaignCoreConfig,
    clock: SharedClock,
}

impl ScheduleExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        plans: Arc<dyn PlanStore>,
        orchestrator: DeploymentOrchestrator,
        retry_policy: RetryPolicy,
        notifications: NotificationGate,
        queue: Arc<dyn JobQueue>,
        config: CampaignCoreConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            schedules,
            plans,
            orchestrator,
            retry_policy,
            notifications,
            queue,
            config,
            clock,
        }
    }

    /// Entry point for an execute trigger from the job queue.
    pub async fn execute(&self, schedule_id: Uuid) -> Result<ExecutionOutcome> {
        let Some(mut schedule) = self.schedules.get(schedule_id).await? else {
            tracing::info!(schedule_id = %schedule_id, "Schedule deleted concurrently; no-op");
            return Ok(ExecutionOutcome::ScheduleGone);
        };

        let now = self.clock.now();
        if !schedule.can_be_executed(now) {
            tracing::debug!(
                schedule_id = %schedule_id,
                status = %schedule.status,
                active = schedule.active,
                "Schedule not eligible for execution; no-op"
            );
            return Ok(ExecutionOutcome::NotEligible);
        }

        let (plan, failures) = self.validate_preconditions(&schedule, now).await?;

        if failures == vec![ValidationFailure::OutsideExecutionWindow] {
            return self
                .reschedule_for_window(&mut schedule, plan.as_ref(), now)
                .await;
        }
        if !failures.is_empty() {
            return self
                .fail_validation(&mut schedule, plan.as_ref(), failures, now)
                .await;
        }
        // All validation failures ruled out above, so the plan is present
        let Some(mut plan) = plan else {
            return Err(CampaignCoreError::Orchestration(
                "validated schedule has no plan".to_string(),
            ));
        };

        // Store-level claim: losing the race means another trigger is running
        if !self.schedules.begin_execution(schedule_id).await? {
            tracing::info!(schedule_id = %schedule_id, "Schedule already claimed; no-op");
            return Ok(ExecutionOutcome::AlreadyClaimed);
        }
        schedule.status = ScheduleStatus::Executing;

        match self.run_deployment(&mut schedule, &mut plan, now).await {
            Ok(outcome) => Ok(outcome),
            Err(infra) => {
                // Never leave the record executing; record and re-raise for
                // the queue's outer retry layer
                schedule.record_failure(infra.to_string(), now);
                schedule.status = ScheduleStatus::Failed;
                schedule.updated_at = now;
                if let Err(persist_err) = self.schedules.update(&schedule).await {
                    tracing::error!(
                        schedule_id = %schedule_id,
                        error = %persist_err,
                        "Failed to persist failure state"
                    );
                }
                tracing::error!(
                    schedule_id = %schedule_id,
                    error = %infra,
                    "Infrastructure error during execution; re-raising to job queue"
                );
                Err(infra)
            }
        }
    }

    /// Step 3: structured precondition validation.
    async fn validate_preconditions(
        &self,
        schedule: &ExecutionSchedule,
        now: DateTime<Utc>,
    ) -> Result<(Option<CampaignPlan>, Vec<ValidationFailure>)> {
        let mut failures = Vec::new();

        let plan = self.plans.get(schedule.campaign_plan_id).await?;
        match &plan {
            None => failures.push(ValidationFailure::PlanNotFound),
            Some(plan) => {
                if !plan.is_approved() {
                    failures.push(ValidationFailure::PlanNotApproved {
                        current: format!("{:?}", plan.approval_status).to_lowercase(),
                    });
                }
                if !plan.generated_content.is_complete() {
                    failures.push(ValidationFailure::MissingContent {
                        artifacts: plan
                            .generated_content
                            .missing_artifacts()
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    });
                }
            }
        }

        match window::in_window(&schedule.execution_rules, now) {
            Ok(true) => {}
            Ok(false) => failures.push(ValidationFailure::OutsideExecutionWindow),
            Err(e) => failures.push(ValidationFailure::InvalidWindowRules {
                detail: e.to_string(),
            }),
        }

        Ok((plan, failures))
    }

    /// Window was the sole blocker: move the trigger time, stay scheduled.
    async fn reschedule_for_window(
        &self,
        schedule: &mut ExecutionSchedule,
        plan: Option<&CampaignPlan>,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let next = match window::next_window_start(&schedule.execution_rules, now) {
            Ok(next) => next,
            Err(WindowError::NoUpcomingWindow) => {
                // Rules admit no future window at all; that is a
                // misconfiguration, not a reschedule
                return self
                    .fail_validation(
                        schedule,
                        plan,
                        vec![ValidationFailure::InvalidWindowRules {
                            detail: "no upcoming execution window".to_string(),
                        }],
                        now,
                    )
                    .await;
            }
            Err(e) => {
                return self
                    .fail_validation(
                        schedule,
                        plan,
                        vec![ValidationFailure::InvalidWindowRules {
                            detail: e.to_string(),
                        }],
                        now,
                    )
                    .await;
            }
        };

        schedule.scheduled_at = next;
        schedule.next_execution_at = Some(next);
        schedule.metadata.rescheduled_reason = Some(OUTSIDE_EXECUTION_WINDOW.to_string());
        schedule.updated_at = now;
        self.schedules.update(schedule).await?;

        self.enqueue_execution(schedule.id, next, "rescheduled to next execution window")
            .await?;

        tracing::info!(
            schedule_id = %schedule.id,
            next_execution_at = %next,
            "Outside execution window; rescheduled"
        );
        Ok(ExecutionOutcome::Rescheduled {
            next_execution_at: next,
        })
    }

    /// Permanent misconfiguration: terminal failure without deployment.
    async fn fail_validation(
        &self,
        schedule: &mut ExecutionSchedule,
        plan: Option<&CampaignPlan>,
        failures: Vec<ValidationFailure>,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let message = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        schedule.status = ScheduleStatus::Failed;
        schedule.record_failure(message.clone(), now);
        schedule.updated_at = now;
        self.schedules.update(schedule).await?;

        tracing::warn!(
            schedule_id = %schedule.id,
            error = %message,
            "Validation failed; schedule terminally failed"
        );
        self.notifications
            .notify_failure(schedule, plan, &message)
            .await;

        Ok(ExecutionOutcome::ValidationFailed { failures })
    }

    /// Steps 4-6: fan-out, finalization, retry decision.
    async fn run_deployment(
        &self,
        schedule: &mut ExecutionSchedule,
        plan: &mut CampaignPlan,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        tracing::info!(
            schedule_id = %schedule.id,
            platforms = schedule.platform_targets.len(),
            "Starting deployment fan-out"
        );
        let summary = self.orchestrator.deploy_all(schedule, plan).await;

        let accepted = summary.any_succeeded()
            && (self.config.deployment.accept_partial_success
                || summary.failures().count() == 0);

        if accepted {
            self.finalize_success(schedule, plan, summary, now).await
        } else {
            let error = if schedule.platform_targets.is_empty() {
                "No platforms configured for deployment".to_string()
            } else {
                summary.failure_report()
            };
            self.finalize_failure(schedule, plan, error, now).await
        }
    }

    async fn finalize_success(
        &self,
        schedule: &mut ExecutionSchedule,
        plan: &mut CampaignPlan,
        summary: DeploymentSummary,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let target = ScheduleStateMachine::determine_target_state(
            schedule.status,
            &ScheduleEvent::Complete,
        )
        .map_err(|e| CampaignCoreError::StateTransition(e.to_string()))?;
        schedule.status = target;

        schedule.metadata.rollback = summary.rollback_data();
        schedule.metadata.error_message = None;
        schedule.metadata.rescheduled_reason = None;
        schedule.updated_at = now;

        plan.execution_started_at = Some(now);
        plan.last_execution_schedule_id = Some(schedule.id);
        self.plans.update(plan).await?;
        self.schedules.update(schedule).await?;

        let rules = &schedule.execution_rules;
        if rules.auto_monitor {
            let interval = rules
                .monitoring_interval_seconds
                .unwrap_or(self.config.monitoring.default_interval_seconds);
            let request = JobRequest::new(
                ExecutionJob::MonitorSchedule {
                    schedule_id: schedule.id,
                },
                now,
            )
            .with_run_at(now + Duration::seconds(interval as i64))
            .with_reason("post-launch monitoring");
            self.queue.enqueue(request).await?;
        }
        if rules.auto_optimize {
            let delay = rules
                .optimization_delay_seconds
                .unwrap_or(self.config.monitoring.default_interval_seconds);
            let request = JobRequest::new(
                ExecutionJob::OptimizeSchedule {
                    schedule_id: schedule.id,
                },
                now,
            )
            .with_run_at(now + Duration::seconds(delay as i64))
            .with_reason("post-launch optimization")
            .with_priority(JobPriority::Low);
            self.queue.enqueue(request).await?;
        }

        tracing::info!(
            schedule_id = %schedule.id,
            platforms_succeeded = summary.successes().count(),
            platforms_failed = summary.failures().count(),
            "Execution completed"
        );
        self.notifications
            .notify_completion(schedule, Some(&*plan), &summary)
            .await;

        Ok(ExecutionOutcome::Completed { summary })
    }

    async fn finalize_failure(
        &self,
        schedule: &mut ExecutionSchedule,
        plan: &CampaignPlan,
        error: String,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let target = ScheduleStateMachine::determine_target_state(
            schedule.status,
            &ScheduleEvent::Fail(error.clone()),
        )
        .map_err(|e| CampaignCoreError::StateTransition(e.to_string()))?;
        schedule.status = target;
        schedule.record_failure(error.clone(), now);
        schedule.metadata.retry.retry_count += 1;
        schedule.updated_at = now;

        if self.retry_policy.should_retry(schedule, now) {
            let next = self
                .retry_policy
                .calculate_retry_time(schedule.retry_count(), now);

            let target = ScheduleStateMachine::determine_target_state(
                schedule.status,
                &ScheduleEvent::Retry,
            )
            .map_err(|e| CampaignCoreError::StateTransition(e.to_string()))?;
            schedule.status = target;
            schedule.next_execution_at = Some(next);
            self.schedules.update(schedule).await?;

            self.enqueue_execution(schedule.id, next, "deployment retry")
                .await?;

            tracing::warn!(
                schedule_id = %schedule.id,
                retry_count = schedule.retry_count(),
                next_execution_at = %next,
                error = %error,
                "Deployment failed; retry scheduled"
            );
            Ok(ExecutionOutcome::FailedWillRetry {
                next_execution_at: next,
            })
        } else {
            self.schedules.update(schedule).await?;

            tracing::error!(
                schedule_id = %schedule.id,
                retry_count = schedule.retry_count(),
                error = %error,
                "Deployment failed terminally"
            );
            self.notifications
                .notify_failure(schedule, Some(plan), &error)
                .await;

            Ok(ExecutionOutcome::FailedTerminally { error })
        }
    }

    async fn enqueue_execution(
        &self,
        schedule_id: Uuid,
        run_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<()> {
        let request = JobRequest::new(
            ExecutionJob::ExecuteSchedule { schedule_id },
            self.clock.now(),
        )
        .with_run_at(run_at)
        .with_reason(reason);
        self.queue.enqueue(request).await?;
        Ok(())
    }
}
