//! # Notification Gate
//!
//! Decides whether a terminal transition should produce a notice and who
//! receives it. Delivery itself belongs to the external sender; a failed send
//! is logged and never fails the schedule.

use serde_json::json;
use std::sync::Arc;

use crate::models::{CampaignPlan, DeploymentSummary, ExecutionSchedule};
use crate::stores::NotificationSender;

pub struct NotificationGate {
    sender: Arc<dyn NotificationSender>,
}

impl NotificationGate {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }

    pub fn should_notify(schedule: &ExecutionSchedule) -> bool {
        schedule.execution_rules.notifications_enabled()
    }

    /// Schedule creator + plan owner + configured extra addresses, deduplicated.
    pub fn recipients(schedule: &ExecutionSchedule, plan: Option<&CampaignPlan>) -> Vec<String> {
        let mut recipients = vec![schedule.created_by.clone()];
        if let Some(plan) = plan {
            recipients.push(plan.owner_email.clone());
        }
        recipients.extend(schedule.execution_rules.notification_emails.iter().cloned());

        let mut seen = std::collections::HashSet::new();
        recipients.retain(|email| seen.insert(email.clone()));
        recipients
    }

    pub async fn notify_completion(
        &self,
        schedule: &ExecutionSchedule,
        plan: Option<&CampaignPlan>,
        summary: &DeploymentSummary,
    ) {
        if !Self::should_notify(schedule) {
            return;
        }
        let data = json!({
            "schedule_id": schedule.id,
            "schedule_name": schedule.name,
            "platforms_succeeded": summary.successes().map(|r| r.platform).collect::<Vec<_>>(),
            "platforms_failed": summary.failures().map(|r| r.platform).collect::<Vec<_>>(),
        });
        self.deliver(schedule, plan, "campaign_execution_completed", data)
            .await;
    }

    pub async fn notify_failure(
        &self,
        schedule: &ExecutionSchedule,
        plan: Option<&CampaignPlan>,
        error: &str,
    ) {
        if !Self::should_notify(schedule) {
            return;
        }
        let data = json!({
            "schedule_id": schedule.id,
            "schedule_name": schedule.name,
            "error": error,
        });
        self.deliver(schedule, plan, "campaign_execution_failed", data)
            .await;
    }

    async fn deliver(
        &self,
        schedule: &ExecutionSchedule,
        plan: Option<&CampaignPlan>,
        template: &str,
        data: serde_json::Value,
    ) {
        let recipients = Self::recipients(schedule, plan);
        if let Err(e) = self.sender.send(&recipients, template, data).await {
            tracing::warn!(
                schedule_id = %schedule.id,
                template = template,
                error = %e,
                "Notification delivery failed"
            );
        }
    }
}
