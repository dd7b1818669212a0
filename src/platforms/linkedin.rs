//! LinkedIn deployment adapter.
//!
//! Budgets are billed in minor currency units (cents). LinkedIn targeting is
//! the only one that carries job functions and skills through.

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

pub struct LinkedInAdapter {
    client: Arc<dyn PlatformClient>,
}

impl LinkedInAdapter {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    fn map_objective(objective: CampaignObjective) -> &'static str {
        match objective {
            CampaignObjective::BrandAwareness => "BRAND_AWARENESS",
            CampaignObjective::LeadGeneration => "LEAD_GENERATION",
            CampaignObjective::WebsiteTraffic => "WEBSITE_VISITS",
            CampaignObjective::Engagement => "ENGAGEMENT",
            // Conservative conversions-oriented default
            CampaignObjective::CustomerAcquisition | CampaignObjective::Conversions => {
                "WEBSITE_CONVERSIONS"
            }
        }
    }

    fn map_bid_strategy(strategy: BidStrategy) -> &'static str {
        match strategy {
            BidStrategy::LowestCost => "MAX_DELIVERY",
            BidStrategy::CostCap => "COST_CAP",
            BidStrategy::TargetCost => "TARGET_COST",
        }
    }

    fn map_targeting(audience: &AudienceTargeting) -> serde_json::Value {
        let mut targeting = serde_json::Map::new();
        if audience.age_min.is_some() || audience.age_max.is_some() {
            targeting.insert(
                "age_range".into(),
                json!({ "min": audience.age_min, "max": audience.age_max }),
            );
        }
        if !audience.locations.is_empty() {
            targeting.insert("locations".into(), json!(audience.locations));
        }
        if !audience.job_functions.is_empty() {
            targeting.insert("job_functions".into(), json!(audience.job_functions));
        }
        if !audience.skills.is_empty() {
            targeting.insert("skills".into(), json!(audience.skills));
        }
        if !audience.interests.is_empty() {
            targeting.insert("interests".into(), json!(audience.interests));
        }
        serde_json::Value::Object(targeting)
    }
}

#[async_trait]
impl DeploymentAdapter for LinkedInAdapter {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn deploy(&self, ctx: &DeploymentContext<'_>) -> DeploymentResult {
        let spec = CampaignSpec {
            name: format!("{} (LinkedIn)", ctx.schedule_name),
            objective: Self::map_objective(ctx.plan.objective).to_string(),
            daily_budget: ctx.effective_budget().minor_units(),
            bid_strategy: ctx
                .target
                .bid_strategy
                .map(|s| Self::map_bid_strategy(s).to_string()),
            paused: true,
        };
        let targeting = Self::map_targeting(&ctx.effective_audience());

        deploy_campaign_graph(Platform::LinkedIn, self.client.as_ref(), ctx, spec, targeting)
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
        let new_budget = reduced_budget_minor_units(current_budget);
        self.client
            .update_campaign_budget(connection, campaign_id, new_budget)
            .await?;
        Ok(format!("reduced_daily_budget_to_{new_budget}_cents"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_mapping() {
        assert_eq!(
            LinkedInAdapter::map_objective(CampaignObjective::LeadGeneration),
            "LEAD_GENERATION"
        );
        assert_eq!(
            LinkedInAdapter::map_objective(CampaignObjective::CustomerAcquisition),
            "WEBSITE_CONVERSIONS"
        );
    }

    #[test]
    fn test_targeting_carries_professional_fields() {
        let audience = AudienceTargeting {
            job_functions: vec!["Engineering".into()],
            skills: vec!["Rust".into()],
            ..AudienceTargeting::default()
        };
        let targeting = LinkedInAdapter::map_targeting(&audience);
        assert_eq!(targeting["job_functions"][0], "Engineering");
        assert_eq!(targeting["skills"][0], "Rust");
        assert!(targeting.get("locations").is_none());
        assert!(targeting.get("age_range").is_none());
    }
}
