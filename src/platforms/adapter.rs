//! Deployment adapter contract and the shared campaign-graph build sequence.
//!
//! Each adapter maps the plan's abstract objective, audience and budget into
//! its platform's native conventions, then drives the same create sequence:
//! paused campaign, one ad group, one ad per content asset. Platform call
//! failures become `DeploymentResult { success: false, .. }` values; adapters
//! never throw past the orchestrator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    AudienceTargeting, Budget, CampaignPlan, DeploymentResult, PerformanceMetrics, PlatformTarget,
    SubObjectCounts,
};
use crate::platforms::client::{
    AdGroupSpec, AdSpec, CampaignSpec, DateRange, PlatformApiError, PlatformClient,
    PlatformConnection,
};
use crate::platforms::Platform;

/// Everything an adapter needs for one deployment attempt.
pub struct DeploymentContext<'a> {
    pub schedule_id: Uuid,
    pub schedule_name: &'a str,
    pub plan: &'a CampaignPlan,
    pub target: &'a PlatformTarget,
    pub connection: &'a PlatformConnection,
}

impl DeploymentContext<'_> {
    /// Daily budget for this deployment: the platform target's override when
    /// present, else the plan default.
    pub fn effective_budget(&self) -> Budget {
        self.target.daily_budget.unwrap_or(self.plan.daily_budget)
    }

    /// Plan audience with the target's per-field overrides applied.
    pub fn effective_audience(&self) -> AudienceTargeting {
        let base = &self.plan.target_audience;
        let Some(overrides) = &self.target.targeting_overrides else {
            return base.clone();
        };
        AudienceTargeting {
            age_min: overrides.age_min.or(base.age_min),
            age_max: overrides.age_max.or(base.age_max),
            locations: if overrides.locations.is_empty() {
                base.locations.clone()
            } else {
                overrides.locations.clone()
            },
            interests: if overrides.interests.is_empty() {
                base.interests.clone()
            } else {
                overrides.interests.clone()
            },
            job_functions: if overrides.job_functions.is_empty() {
                base.job_functions.clone()
            } else {
                overrides.job_functions.clone()
            },
            skills: if overrides.skills.is_empty() {
                base.skills.clone()
            } else {
                overrides.skills.clone()
            },
        }
    }
}

/// Contract each platform adapter implements.
#[async_trait]
pub trait DeploymentAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Deploy the plan as a paused campaign graph. Never errors; failures are
    /// reported in the result.
    async fn deploy(&self, ctx: &DeploymentContext<'_>) -> DeploymentResult;

    /// Compensating pause call, used by rollback and emergency stop.
    async fn pause_campaign(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
    ) -> Result<(), PlatformApiError>;

    /// Current performance metrics for a deployed campaign.
    async fn fetch_performance(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        range: DateRange,
    ) -> Result<PerformanceMetrics, PlatformApiError>;

    /// Budget adjustment in response to a threshold breach. Returns a
    /// description of the action taken, recorded in optimization history.
    async fn apply_optimization(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        current_budget: Budget,
    ) -> Result<String, PlatformApiError>;
}

/// Shared create sequence: paused campaign, one ad group, one ad per asset.
pub(crate) async fn deploy_campaign_graph(
    platform: Platform,
    client: &dyn PlatformClient,
    ctx: &DeploymentContext<'_>,
    campaign_spec: CampaignSpec,
    targeting: serde_json::Value,
) -> DeploymentResult {
    debug_assert!(campaign_spec.paused, "campaigns must be created paused");

    let campaign_id = match client.create_campaign(ctx.connection, &campaign_spec).await {
        Ok(id) => id,
        Err(e) => return DeploymentResult::failed(platform, e.to_string()),
    };

    let ad_group_spec = AdGroupSpec {
        name: format!("{} - ad group", ctx.schedule_name),
        targeting,
    };
    let ad_group_id = match client
        .create_ad_group(ctx.connection, &campaign_id, &ad_group_spec)
        .await
    {
        Ok(id) => id,
        Err(e) => return DeploymentResult::failed(platform, e.to_string()),
    };

    let mut ads_created = 0u32;
    for (index, asset) in ctx.plan.generated_content.assets.iter().enumerate() {
        let ad_spec = AdSpec {
            name: format!("{} - ad {}", ctx.schedule_name, index + 1),
            asset: asset.clone(),
        };
        match client.create_ad(ctx.connection, &ad_group_id, &ad_spec).await {
            Ok(_) => ads_created += 1,
            Err(e) => return DeploymentResult::failed(platform, e.to_string()),
        }
    }

    tracing::info!(
        schedule_id = %ctx.schedule_id,
        platform = %platform,
        campaign_id = %campaign_id,
        ads_created = ads_created,
        "Platform deployment succeeded"
    );

    DeploymentResult::succeeded(
        platform,
        campaign_id,
        SubObjectCounts {
            ad_groups: 1,
            ads: ads_created,
        },
    )
}

/// New daily budget after an optimization cut, in minor units. 20% reduction
/// with integer math, floored at one currency unit.
pub(crate) fn reduced_budget_minor_units(current: Budget) -> i64 {
    ((current.minor_units() * 80) / 100).max(100)
}

/// Closed map from platform to its adapter.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Arc<dyn DeploymentAdapter>>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Arc<dyn DeploymentAdapter>>) -> Self {
        Self {
            adapters: adapters.into_iter().map(|a| (a.platform(), a)).collect(),
        }
    }

    /// Registry with the three standard adapters over one shared client per
    /// platform API.
    pub fn standard(
        meta_client: Arc<dyn PlatformClient>,
        google_client: Arc<dyn PlatformClient>,
        linkedin_client: Arc<dyn PlatformClient>,
    ) -> Self {
        Self::new(vec![
            Arc::new(crate::platforms::MetaAdapter::new(meta_client)),
            Arc::new(crate::platforms::GoogleAdsAdapter::new(google_client)),
            Arc::new(crate::platforms::LinkedInAdapter::new(linkedin_client)),
        ])
    }

    pub fn for_platform(&self, platform: Platform) -> Option<Arc<dyn DeploymentAdapter>> {
        self.adapters.get(&platform).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, CampaignObjective, GeneratedContent};
    use chrono::Utc;

    fn sample_plan() -> CampaignPlan {
        CampaignPlan {
            id: Uuid::new_v4(),
            name: "Plan".into(),
            owner_email: "owner@example.com".into(),
            approval_status: ApprovalStatus::Approved,
            objective: CampaignObjective::LeadGeneration,
            generated_content: GeneratedContent::default(),
            target_audience: AudienceTargeting {
                age_min: Some(25),
                age_max: Some(45),
                locations: vec!["US".into()],
                interests: vec!["software".into()],
                ..AudienceTargeting::default()
            },
            daily_budget: Budget::from_minor_units(10000),
            currency: "USD".into(),
            execution_started_at: None,
            execution_completed_at: None,
            last_execution_schedule_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_connection() -> PlatformConnection {
        PlatformConnection {
            id: Uuid::new_v4(),
            user_email: "owner@example.com".into(),
            platform: Platform::Meta,
            account_id: "act_1".into(),
            access_token: "token".into(),
            expires_at: None,
        }
    }

    #[test]
    fn test_reduced_budget_is_exact_and_floored() {
        assert_eq!(reduced_budget_minor_units(Budget::from_minor_units(10000)), 8000);
        assert_eq!(reduced_budget_minor_units(Budget::from_minor_units(105)), 100);
        assert_eq!(reduced_budget_minor_units(Budget::from_minor_units(50)), 100);
    }

    #[test]
    fn test_effective_audience_overrides_per_field() {
        let plan = sample_plan();
        let target = PlatformTarget {
            daily_budget: Some(Budget::from_minor_units(5000)),
            bid_strategy: None,
            targeting_overrides: Some(AudienceTargeting {
                locations: vec!["DE".into()],
                ..AudienceTargeting::default()
            }),
        };
        let connection = sample_connection();
        let ctx = DeploymentContext {
            schedule_id: Uuid::new_v4(),
            schedule_name: "Launch",
            plan: &plan,
            target: &target,
            connection: &connection,
        };

        let audience = ctx.effective_audience();
        assert_eq!(audience.locations, vec!["DE".to_string()]);
        assert_eq!(audience.age_min, Some(25));
        assert_eq!(audience.interests, vec!["software".to_string()]);
        assert_eq!(ctx.effective_budget().minor_units(), 5000);
    }

    struct ScriptedClient {
        fail_ad_group: bool,
    }

    #[async_trait]
    impl PlatformClient for ScriptedClient {
        async fn create_campaign(
            &self,
            _connection: &PlatformConnection,
            _spec: &CampaignSpec,
        ) -> Result<String, PlatformApiError> {
            Ok("cmp-1".into())
        }

        async fn create_ad_group(
            &self,
            _connection: &PlatformConnection,
            _campaign_id: &str,
            _spec: &AdGroupSpec,
        ) -> Result<String, PlatformApiError> {
            if self.fail_ad_group {
                Err(PlatformApiError::Validation("bad targeting".into()))
            } else {
                Ok("grp-1".into())
            }
        }

        async fn create_ad(
            &self,
            _connection: &PlatformConnection,
            _ad_group_id: &str,
            _spec: &AdSpec,
        ) -> Result<String, PlatformApiError> {
            Ok("ad-1".into())
        }

        async fn pause_campaign(
            &self,
            _connection: &PlatformConnection,
            _campaign_id: &str,
        ) -> Result<(), PlatformApiError> {
            Ok(())
        }

        async fn update_campaign_budget(
            &self,
            _connection: &PlatformConnection,
            _campaign_id: &str,
            _daily_budget: i64,
        ) -> Result<(), PlatformApiError> {
            Ok(())
        }

        async fn get_performance(
            &self,
            _connection: &PlatformConnection,
            _campaign_id: &str,
            _range: DateRange,
        ) -> Result<PerformanceMetrics, PlatformApiError> {
            Ok(PerformanceMetrics::default())
        }

        async fn test_connection(
            &self,
            _connection: &PlatformConnection,
        ) -> Result<(), PlatformApiError> {
            Ok(())
        }
    }

    fn graph_spec() -> CampaignSpec {
        CampaignSpec {
            name: "Launch".into(),
            objective: "LEAD_GENERATION".into(),
            daily_budget: 10000,
            bid_strategy: None,
            paused: true,
        }
    }

    #[test]
    fn test_campaign_graph_creates_one_ad_per_asset() {
        let mut plan = sample_plan();
        plan.generated_content.assets = vec!["banner.png".into(), "video.mp4".into()];
        let target = PlatformTarget::default();
        let connection = sample_connection();
        let ctx = DeploymentContext {
            schedule_id: Uuid::new_v4(),
            schedule_name: "Launch",
            plan: &plan,
            target: &target,
            connection: &connection,
        };
        let client = ScriptedClient {
            fail_ad_group: false,
        };

        let result = tokio_test::block_on(deploy_campaign_graph(
            Platform::Meta,
            &client,
            &ctx,
            graph_spec(),
            serde_json::json!({}),
        ));

        assert!(result.success);
        assert_eq!(result.campaign_id.as_deref(), Some("cmp-1"));
        assert_eq!(result.sub_object_counts.ad_groups, 1);
        assert_eq!(result.sub_object_counts.ads, 2);
    }

    #[test]
    fn test_campaign_graph_failure_becomes_a_value() {
        let plan = sample_plan();
        let target = PlatformTarget::default();
        let connection = sample_connection();
        let ctx = DeploymentContext {
            schedule_id: Uuid::new_v4(),
            schedule_name: "Launch",
            plan: &plan,
            target: &target,
            connection: &connection,
        };
        let client = ScriptedClient {
            fail_ad_group: true,
        };

        let result = tokio_test::block_on(deploy_campaign_graph(
            Platform::Meta,
            &client,
            &ctx,
            graph_spec(),
            serde_json::json!({}),
        ));

        assert!(!result.success);
        assert!(result.campaign_id.is_none());
        assert!(result.error.as_deref().is_some_and(|e| e.contains("bad targeting")));
    }
}
