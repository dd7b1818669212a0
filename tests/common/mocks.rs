//! In-memory collaborator implementations for integration tests.
//!
//! Stores are HashMaps behind a parking_lot lock; the platform client is
//! scripted per method and records every call so tests can assert on the
//! exact sequence of platform operations.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use campaign_core::jobs::{JobQueue, JobRequest, QueueError};
use campaign_core::models::{CampaignPlan, ExecutionSchedule, PerformanceMetrics};
use campaign_core::platforms::{
    AdGroupSpec, AdSpec, CampaignSpec, DateRange, Platform, PlatformApiError, PlatformClient,
    PlatformConnection,
};
use campaign_core::state_machine::ScheduleStatus;
use campaign_core::stores::{
    ConnectionStore, NotificationError, NotificationSender, PlanStore, ScheduleStore, StoreError,
};

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryScheduleStore {
    records: Mutex<HashMap<Uuid, ExecutionSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn with(schedule: ExecutionSchedule) -> Arc<Self> {
        let store = Self::default();
        store.records.lock().insert(schedule.id, schedule);
        Arc::new(store)
    }

    pub fn snapshot(&self, id: Uuid) -> Option<ExecutionSchedule> {
        self.records.lock().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) {
        self.records.lock().remove(&id);
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn get(&self, id: Uuid) -> Result<Option<ExecutionSchedule>, StoreError> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn insert(&self, schedule: &ExecutionSchedule) -> Result<(), StoreError> {
        self.records.lock().insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn update(&self, schedule: &ExecutionSchedule) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        if !records.contains_key(&schedule.id) {
            return Err(StoreError::NotFound(schedule.id));
        }
        records.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn begin_execution(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.lock();
        let schedule = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if schedule.status != ScheduleStatus::Scheduled {
            return Ok(false);
        }
        schedule.status = ScheduleStatus::Executing;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryPlanStore {
    records: Mutex<HashMap<Uuid, CampaignPlan>>,
}

impl InMemoryPlanStore {
    pub fn with(plan: CampaignPlan) -> Arc<Self> {
        let store = Self::default();
        store.records.lock().insert(plan.id, plan);
        Arc::new(store)
    }

    pub fn snapshot(&self, id: Uuid) -> Option<CampaignPlan> {
        self.records.lock().get(&id).cloned()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn get(&self, id: Uuid) -> Result<Option<CampaignPlan>, StoreError> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn update(&self, plan: &CampaignPlan) -> Result<(), StoreError> {
        self.records.lock().insert(plan.id, plan.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConnectionStore {
    records: Mutex<HashMap<(String, Platform), PlatformConnection>>,
}

impl InMemoryConnectionStore {
    pub fn add(&self, connection: PlatformConnection) {
        self.records.lock().insert(
            (connection.user_email.clone(), connection.platform),
            connection,
        );
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn connection(
        &self,
        user_email: &str,
        platform: Platform,
    ) -> Result<Option<PlatformConnection>, StoreError> {
        Ok(self
            .records
            .lock()
            .get(&(user_email.to_string(), platform))
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Queue and notifications
// ---------------------------------------------------------------------------

/// Records enqueued jobs instead of dispatching them.
#[derive(Default)]
pub struct RecordingJobQueue {
    pub requests: Mutex<Vec<JobRequest>>,
}

impl RecordingJobQueue {
    pub fn enqueued(&self) -> Vec<JobRequest> {
        self.requests.lock().clone()
    }

    pub fn drain(&self) -> Vec<JobRequest> {
        std::mem::take(&mut *self.requests.lock())
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn enqueue(&self, request: JobRequest) -> Result<(), QueueError> {
        self.requests.lock().push(request);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub recipients: Vec<String>,
    pub template: String,
    pub data: serde_json::Value,
}

#[derive(Default)]
pub struct RecordingNotificationSender {
    pub sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotificationSender {
    pub fn notifications(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(
        &self,
        recipients: &[String],
        template: &str,
        data: serde_json::Value,
    ) -> Result<(), NotificationError> {
        self.sent.lock().push(SentNotification {
            recipients: recipients.to_vec(),
            template: template.to_string(),
            data,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Platform client
// ---------------------------------------------------------------------------

/// A call made against the mock client, for sequence assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateCampaign { name: String, paused: bool },
    CreateAdGroup { campaign_id: String },
    CreateAd { ad_group_id: String, asset: String },
    PauseCampaign { campaign_id: String },
    UpdateBudget { campaign_id: String, daily_budget: i64 },
    GetPerformance { campaign_id: String },
}

/// Scripted platform client. Succeeds by default with generated ids; any
/// operation can be scripted to fail, and performance metrics can be staged.
pub struct MockPlatformClient {
    prefix: String,
    counter: AtomicU64,
    pub calls: Mutex<Vec<RecordedCall>>,
    fail_create_campaign: Mutex<Option<PlatformApiError>>,
    fail_create_ad_group: Mutex<Option<PlatformApiError>>,
    fail_pause: Mutex<Option<PlatformApiError>>,
    performance: Mutex<PerformanceMetrics>,
}

impl MockPlatformClient {
    pub fn new(prefix: &str) -> Arc<Self> {
        Arc::new(Self {
            prefix: prefix.to_string(),
            counter: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
            fail_create_campaign: Mutex::new(None),
            fail_create_ad_group: Mutex::new(None),
            fail_pause: Mutex::new(None),
            performance: Mutex::new(PerformanceMetrics::default()),
        })
    }

    pub fn fail_campaign_creation(&self, error: PlatformApiError) {
        *self.fail_create_campaign.lock() = Some(error);
    }

    pub fn fail_ad_group_creation(&self, error: PlatformApiError) {
        *self.fail_create_ad_group.lock() = Some(error);
    }

    pub fn fail_pause(&self, error: PlatformApiError) {
        *self.fail_pause.lock() = Some(error);
    }

    pub fn stage_performance(&self, metrics: PerformanceMetrics) {
        *self.performance.lock() = metrics;
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn next_id(&self, kind: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{kind}-{n}", self.prefix)
    }
}

#[async_trait]
impl PlatformClient for MockPlatformClient {
    async fn create_campaign(
        &self,
        _connection: &PlatformConnection,
        spec: &CampaignSpec,
    ) -> Result<String, PlatformApiError> {
        self.calls.lock().push(RecordedCall::CreateCampaign {
            name: spec.name.clone(),
            paused: spec.paused,
        });
        if let Some(error) = self.fail_create_campaign.lock().clone() {
            return Err(error);
        }
        Ok(self.next_id("campaign"))
    }

    async fn create_ad_group(
        &self,
        _connection: &PlatformConnection,
        campaign_id: &str,
        _spec: &AdGroupSpec,
    ) -> Result<String, PlatformApiError> {
        self.calls.lock().push(RecordedCall::CreateAdGroup {
            campaign_id: campaign_id.to_string(),
        });
        if let Some(error) = self.fail_create_ad_group.lock().clone() {
            return Err(error);
        }
        Ok(self.next_id("adgroup"))
    }

    async fn create_ad(
        &self,
        _connection: &PlatformConnection,
        ad_group_id: &str,
        spec: &AdSpec,
    ) -> Result<String, PlatformApiError> {
        self.calls.lock().push(RecordedCall::CreateAd {
            ad_group_id: ad_group_id.to_string(),
            asset: spec.asset.clone(),
        });
        Ok(self.next_id("ad"))
    }

    async fn pause_campaign(
        &self,
        _connection: &PlatformConnection,
        campaign_id: &str,
    ) -> Result<(), PlatformApiError> {
        self.calls.lock().push(RecordedCall::PauseCampaign {
            campaign_id: campaign_id.to_string(),
        });
        if let Some(error) = self.fail_pause.lock().clone() {
            return Err(error);
        }
        Ok(())
    }

    async fn update_campaign_budget(
        &self,
        _connection: &PlatformConnection,
        campaign_id: &str,
        daily_budget: i64,
    ) -> Result<(), PlatformApiError> {
        self.calls.lock().push(RecordedCall::UpdateBudget {
            campaign_id: campaign_id.to_string(),
            daily_budget,
        });
        Ok(())
    }

    async fn get_performance(
        &self,
        _connection: &PlatformConnection,
        campaign_id: &str,
        _range: DateRange,
    ) -> Result<PerformanceMetrics, PlatformApiError> {
        self.calls.lock().push(RecordedCall::GetPerformance {
            campaign_id: campaign_id.to_string(),
        });
        Ok(*self.performance.lock())
    }

    async fn test_connection(
        &self,
        _connection: &PlatformConnection,
    ) -> Result<(), PlatformApiError> {
        Ok(())
    }
}
