//! Test data builders and the wired-up service harness.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use campaign_core::clock::FixedClock;
use campaign_core::config::CampaignCoreConfig;
use campaign_core::models::{
    ApprovalStatus, AudienceTargeting, Budget, CampaignObjective, CampaignPlan, ExecutionRules,
    ExecutionSchedule, GeneratedContent, PlatformTarget, ScheduleMetadata,
};
use campaign_core::orchestration::CampaignExecutionService;
use campaign_core::platforms::{AdapterRegistry, Platform, PlatformConnection};
use campaign_core::state_machine::ScheduleStatus;

use super::mocks::{
    InMemoryConnectionStore, InMemoryPlanStore, InMemoryScheduleStore, MockPlatformClient,
    RecordingJobQueue, RecordingNotificationSender,
};

/// A fixed instant every scenario starts from: Monday noon UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
}

pub struct PlanBuilder {
    plan: CampaignPlan,
}

impl PlanBuilder {
    pub fn approved() -> Self {
        let now = base_time();
        Self {
            plan: CampaignPlan {
                id: Uuid::new_v4(),
                name: "Spring launch plan".to_string(),
                owner_email: "owner@example.com".to_string(),
                approval_status: ApprovalStatus::Approved,
                objective: CampaignObjective::LeadGeneration,
                generated_content: GeneratedContent {
                    summary: Some("summary".to_string()),
                    strategy: Some("strategy".to_string()),
                    timeline: Some("timeline".to_string()),
                    assets: vec!["banner.png".to_string(), "video.mp4".to_string()],
                },
                target_audience: AudienceTargeting {
                    age_min: Some(25),
                    age_max: Some(54),
                    locations: vec!["US".to_string()],
                    interests: vec!["software".to_string()],
                    ..AudienceTargeting::default()
                },
                daily_budget: Budget::from_minor_units(15_000),
                currency: "USD".to_string(),
                execution_started_at: None,
                execution_completed_at: None,
                last_execution_schedule_id: None,
                created_at: now - chrono::Duration::days(2),
                updated_at: now - chrono::Duration::days(1),
            },
        }
    }

    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.plan.approval_status = status;
        self
    }

    pub fn with_objective(mut self, objective: CampaignObjective) -> Self {
        self.plan.objective = objective;
        self
    }

    pub fn without_assets(mut self) -> Self {
        self.plan.generated_content.assets.clear();
        self
    }

    pub fn build(self) -> CampaignPlan {
        self.plan
    }
}

pub struct ScheduleBuilder {
    schedule: ExecutionSchedule,
}

impl ScheduleBuilder {
    /// A due, executable schedule for the given plan targeting Meta.
    pub fn due(plan_id: Uuid) -> Self {
        let now = base_time();
        let mut platform_targets = HashMap::new();
        platform_targets.insert(Platform::Meta, PlatformTarget::default());
        Self {
            schedule: ExecutionSchedule {
                id: Uuid::new_v4(),
                campaign_plan_id: plan_id,
                name: "Spring launch".to_string(),
                scheduled_at: now - chrono::Duration::minutes(5),
                next_execution_at: None,
                platform_targets,
                execution_rules: ExecutionRules::default(),
                status: ScheduleStatus::Scheduled,
                active: true,
                priority: 0,
                metadata: ScheduleMetadata::default(),
                created_by: "planner@example.com".to_string(),
                updated_by: "planner@example.com".to_string(),
                created_at: now - chrono::Duration::hours(1),
                updated_at: now - chrono::Duration::hours(1),
            },
        }
    }

    pub fn with_platforms(mut self, platforms: &[Platform]) -> Self {
        self.schedule.platform_targets = platforms
            .iter()
            .map(|p| (*p, PlatformTarget::default()))
            .collect();
        self
    }

    pub fn with_target(mut self, platform: Platform, target: PlatformTarget) -> Self {
        self.schedule.platform_targets.insert(platform, target);
        self
    }

    pub fn with_rules(mut self, rules: ExecutionRules) -> Self {
        self.schedule.execution_rules = rules;
        self
    }

    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.schedule.status = status;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.schedule.created_at = at;
        self
    }

    pub fn build(self) -> ExecutionSchedule {
        self.schedule
    }
}

pub fn connection_for(user_email: &str, platform: Platform) -> PlatformConnection {
    PlatformConnection {
        id: Uuid::new_v4(),
        user_email: user_email.to_string(),
        platform,
        account_id: format!("acct-{platform}"),
        access_token: "token".to_string(),
        expires_at: None,
    }
}

/// Everything a scenario needs: the service plus handles on every mock.
pub struct Harness {
    pub service: CampaignExecutionService,
    pub schedules: Arc<InMemoryScheduleStore>,
    pub plans: Arc<InMemoryPlanStore>,
    pub connections: Arc<InMemoryConnectionStore>,
    pub queue: Arc<RecordingJobQueue>,
    pub notifications: Arc<RecordingNotificationSender>,
    pub meta: Arc<MockPlatformClient>,
    pub google: Arc<MockPlatformClient>,
    pub linkedin: Arc<MockPlatformClient>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    /// Service wired with one plan, one schedule, and connections for the
    /// given platforms, frozen at [`base_time`].
    pub fn with(plan: CampaignPlan, schedule: ExecutionSchedule, connected: &[Platform]) -> Self {
        let schedules = InMemoryScheduleStore::with(schedule.clone());
        let plans = InMemoryPlanStore::with(plan);
        let connections = Arc::new(InMemoryConnectionStore::default());
        for platform in connected {
            connections.add(connection_for(&schedule.created_by, *platform));
        }

        let queue = Arc::new(RecordingJobQueue::default());
        let notifications = Arc::new(RecordingNotificationSender::default());
        let meta = MockPlatformClient::new("meta");
        let google = MockPlatformClient::new("g");
        let linkedin = MockPlatformClient::new("li");
        let clock = Arc::new(FixedClock::new(base_time()));

        let adapters = AdapterRegistry::standard(meta.clone(), google.clone(), linkedin.clone());

        let service = CampaignExecutionService::new(
            schedules.clone(),
            plans.clone(),
            connections.clone(),
            adapters,
            queue.clone(),
            notifications.clone(),
            CampaignCoreConfig::default(),
            clock.clone(),
        );

        Self {
            service,
            schedules,
            plans,
            connections,
            queue,
            notifications,
            meta,
            google,
            linkedin,
            clock,
        }
    }
}
