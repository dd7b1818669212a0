//! Meta (Facebook/Instagram) deployment adapter.
//!
//! Budgets are billed in minor currency units (cents). Objectives map to the
//! outcome-based objective set; anything without a sharper fit falls back to
//! the conversions-oriented `OUTCOME_SALES`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::models::{
    AudienceTargeting, BidStrategy, Budget, CampaignObjective, DeploymentResult,
    PerformanceMetrics,
};
use crate::platforms::adapter::{
    deploy_campaign_graph, reduced_budget_minor_units, DeploymentAdapter, DeploymentContext,
};
use crate::platforms::client::{
    CampaignSpec, DateRange, PlatformApiError, PlatformClient, PlatformConnection,
};
use crate::platforms::Platform;

pub struct MetaAdapter {
    client: Arc<dyn PlatformClient>,
}

impl MetaAdapter {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    fn map_objective(objective: CampaignObjective) -> &'static str {
        match objective {
            CampaignObjective::BrandAwareness => "OUTCOME_AWARENESS",
            CampaignObjective::LeadGeneration => "OUTCOME_LEADS",
            CampaignObjective::WebsiteTraffic => "OUTCOME_TRAFFIC",
            CampaignObjective::Engagement => "OUTCOME_ENGAGEMENT",
            // Conservative conversions-oriented default
            CampaignObjective::CustomerAcquisition | CampaignObjective::Conversions => {
                "OUTCOME_SALES"
            }
        }
    }

    fn map_bid_strategy(strategy: BidStrategy) -> &'static str {
        match strategy {
            BidStrategy::LowestCost => "LOWEST_COST_WITHOUT_CAP",
            BidStrategy::CostCap => "COST_CAP",
            BidStrategy::TargetCost => "LOWEST_COST_WITH_BID_CAP",
        }
    }

    /// Native targeting document; absent audience fields are omitted.
    fn map_targeting(audience: &AudienceTargeting) -> serde_json::Value {
        let mut targeting = serde_json::Map::new();
        if let Some(age_min) = audience.age_min {
            targeting.insert("age_min".into(), json!(age_min));
        }
        if let Some(age_max) = audience.age_max {
            targeting.insert("age_max".into(), json!(age_max));
        }
        if !audience.locations.is_empty() {
            targeting.insert(
                "geo_locations".into(),
                json!({ "countries": audience.locations }),
            );
        }
        if !audience.interests.is_empty() {
            targeting.insert(
                "flexible_spec".into(),
                json!([{ "interests": audience.interests }]),
            );
        }
        serde_json::Value::Object(targeting)
    }
}

#[async_trait]
impl DeploymentAdapter for MetaAdapter {
    fn platform(&self) -> Platform {
        Platform::Meta
    }

    async fn deploy(&self, ctx: &DeploymentContext<'_>) -> DeploymentResult {
        let spec = CampaignSpec {
            name: format!("{} (Meta)", ctx.schedule_name),
            objective: Self::map_objective(ctx.plan.objective).to_string(),
            daily_budget: ctx.effective_budget().minor_units(),
            bid_strategy: ctx
                .target
                .bid_strategy
                .map(|s| Self::map_bid_strategy(s).to_string()),
            paused: true,
        };
        let targeting = Self::map_targeting(&ctx.effective_audience());

        deploy_campaign_graph(Platform::Meta, self.client.as_ref(), ctx, spec, targeting).await
    }

    async fn pause_campaign(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
    ) -> Result<(), PlatformApiError> {
        self.client.pause_campaign(connection, campaign_id).await
    }

    async fn fetch_performance(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        range: DateRange,
    ) -> Result<PerformanceMetrics, PlatformApiError> {
        self.client
            .get_performance(connection, campaign_id, range)
            .await
    }

    async fn apply_optimization(
        &self,
        connection: &PlatformConnection,
        campaign_id: &str,
        current_budget: Budget,
    ) -> Result<String, PlatformApiError> {
        let new_budget = reduced_budget_minor_units(current_budget);
        self.client
            .update_campaign_budget(connection, campaign_id, new_budget)
            .await?;
        Ok(format!("reduced_daily_budget_to_{new_budget}_cents"))
    }
}
