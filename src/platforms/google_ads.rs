//! Google Ads deployment adapter.
//!
//! Budgets are billed in micros (one currency unit = 1,000,000 micros);
//! conversion from the plan's minor units is exact integer math.

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

pub struct GoogleAdsAdapter {
    client: Arc<dyn PlatformClient>,
}

impl GoogleAdsAdapter {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    fn map_objective(objective: CampaignObjective) -> &'static str {
        match objective {
            CampaignObjective::BrandAwareness => "AWARENESS",
            CampaignObjective::LeadGeneration => "LEADS",
            CampaignObjective::WebsiteTraffic => "WEBSITE_TRAFFIC",
            CampaignObjective::Engagement => "ENGAGEMENT",
            // Conservative conversions-oriented default
            CampaignObjective::CustomerAcquisition | CampaignObjective::Conversions => "SALES",
        }
    }

    fn map_bid_strategy(strategy: BidStrategy) -> &'static str {
        match strategy {
            BidStrategy::LowestCost => "MAXIMIZE_CONVERSIONS",
            BidStrategy::CostCap => "TARGET_CPA",
            BidStrategy::TargetCost => "TARGET_SPEND",
        }
    }

    fn map_targeting(audience: &AudienceTargeting) -> serde_json::Value {
        let mut targeting = serde_json::Map::new();
        if audience.age_min.is_some() || audience.age_max.is_some() {
            let mut range = serde_json::Map::new();
            if let Some(age_min) = audience.age_min {
                range.insert("min".into(), json!(age_min));
            }
            if let Some(age_max) = audience.age_max {
                range.insert("max".into(), json!(age_max));
            }
            targeting.insert("age_range".into(), serde_json::Value::Object(range));
        }
        if !audience.locations.is_empty() {
            targeting.insert("locations".into(), json!(audience.locations));
        }
        if !audience.interests.is_empty() {
            targeting.insert("keywords".into(), json!(audience.interests));
        }
        serde_json::Value::Object(targeting)
    }
}

#[async_trait]
impl DeploymentAdapter for GoogleAdsAdapter {
    fn platform(&self) -> Platform {
        Platform::GoogleAds
    }

    async fn deploy(&self, ctx: &DeploymentContext<'_>) -> DeploymentResult {
        let spec = CampaignSpec {
            name: format!("{} (Google Ads)", ctx.schedule_name),
            objective: Self::map_objective(ctx.plan.objective).to_string(),
            daily_budget: ctx.effective_budget().micros(),
            bid_strategy: ctx
                .target
                .bid_strategy
                .map(|s| Self::map_bid_strategy(s).to_string()),
            paused: true,
        };
        let targeting = Self::map_targeting(&ctx.effective_audience());

        deploy_campaign_graph(Platform::GoogleAds, self.client.as_ref(), ctx, spec, targeting)
            .await
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
        // Budget reduction computed in cents, sent in micros
        let new_budget_cents = reduced_budget_minor_units(current_budget);
        let new_budget_micros = new_budget_cents * 10_000;
        self.client
            .update_campaign_budget(connection, campaign_id, new_budget_micros)
            .await?;
        Ok(format!("reduced_daily_budget_to_{new_budget_micros}_micros"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_mapping_default_is_sales() {
        assert_eq!(
            GoogleAdsAdapter::map_objective(CampaignObjective::Conversions),
            "SALES"
        );
        assert_eq!(
            GoogleAdsAdapter::map_objective(CampaignObjective::BrandAwareness),
            "AWARENESS"
        );
    }

    #[test]
    fn test_targeting_age_range_shape() {
        let audience = AudienceTargeting {
            age_min: Some(18),
            age_max: Some(65),
            interests: vec!["crm software".into()],
            ..AudienceTargeting::default()
        };
        let targeting = GoogleAdsAdapter::map_targeting(&audience);
        assert_eq!(targeting["age_range"]["min"], 18);
        assert_eq!(targeting["age_range"]["max"], 65);
        assert_eq!(targeting["keywords"][0], "crm software");
        assert!(targeting.get("locations").is_none());
    }
}
