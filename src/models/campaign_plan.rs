//! Consumed view of the planning layer's CampaignPlan record.
//!
//! The orchestrator reads approval/content fields and writes back the
//! execution timestamps plus a back-reference to the schedule that ran it.
//! Plan content generation itself lives outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Approval state of a campaign plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

/// Abstract campaign objective, mapped per platform by the deployment adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignObjective {
    BrandAwareness,
    LeadGeneration,
    CustomerAcquisition,
    WebsiteTraffic,
    Engagement,
    Conversions,
}

/// Generated content artifacts a plan must carry before it may go live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub assets: Vec<String>,
}

impl GeneratedContent {
    /// All artifacts present and non-empty.
    pub fn is_complete(&self) -> bool {
        let non_empty = |field: &Option<String>| {
            field
                .as_ref()
                .is_some_and(|value| !value.trim().is_empty())
        };
        non_empty(&self.summary)
            && non_empty(&self.strategy)
            && non_empty(&self.timeline)
            && !self.assets.is_empty()
    }

    /// Names of the artifacts that are missing or empty.
    pub fn missing_artifacts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let empty = |field: &Option<String>| {
            field
                .as_ref()
                .map_or(true, |value| value.trim().is_empty())
        };
        if empty(&self.summary) {
            missing.push("summary");
        }
        if empty(&self.strategy) {
            missing.push("strategy");
        }
        if empty(&self.timeline) {
            missing.push("timeline");
        }
        if self.assets.is_empty() {
            missing.push("assets");
        }
        missing
    }
}

/// Abstract audience description, mapped into each platform's targeting schema.
///
/// Absent fields are omitted by the adapters rather than defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudienceTargeting {
    #[serde(default)]
    pub age_min: Option<u8>,
    #[serde(default)]
    pub age_max: Option<u8>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub job_functions: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Error parsing a decimal currency string into a budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetParseError {
    #[error("Invalid budget amount: {0}")]
    Invalid(String),
    #[error("Budget amount out of range: {0}")]
    OutOfRange(String),
}

/// A currency amount held as integer minor units (cents).
///
/// Platform minor-unit conventions differ (Meta and LinkedIn bill in cents,
/// Google Ads in micros); all conversions here are exact integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget {
    minor_units: i64,
}

impl Budget {
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// Parse a decimal string like `"150.00"` or `"99.9"` into cents.
    pub fn parse_decimal(input: &str) -> Result<Self, BudgetParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BudgetParseError::Invalid(input.to_string()));
        }

        let (whole, frac) = match trimmed.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, ""),
        };

        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(BudgetParseError::Invalid(input.to_string()));
        }
        let whole_units: i64 = whole
            .parse()
            .map_err(|_| BudgetParseError::Invalid(input.to_string()))?;
        if whole_units < 0 {
            return Err(BudgetParseError::OutOfRange(input.to_string()));
        }

        // "9.5" means 50 cents, not 5
        let frac_cents: i64 = if frac.is_empty() {
            0
        } else {
            let parsed: i64 = frac
                .parse()
                .map_err(|_| BudgetParseError::Invalid(input.to_string()))?;
            if frac.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };

        let minor_units = whole_units
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(frac_cents))
            .ok_or_else(|| BudgetParseError::OutOfRange(input.to_string()))?;

        Ok(Self { minor_units })
    }

    /// Amount in cents.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Amount in micros (1 currency unit = 1_000_000 micros).
    pub fn micros(&self) -> i64 {
        self.minor_units * 10_000
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.minor_units / 100, self.minor_units % 100)
    }
}

/// The planning layer's campaign plan, as consumed by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignPlan {
    pub id: Uuid,
    pub name: String,
    pub owner_email: String,
    pub approval_status: ApprovalStatus,
    pub objective: CampaignObjective,
    pub generated_content: GeneratedContent,
    pub target_audience: AudienceTargeting,
    /// Default daily budget; per-platform targets may override it
    pub daily_budget: Budget,
    pub currency: String,
    #[serde(default)]
    pub execution_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_execution_schedule_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignPlan {
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    /// The plan run is active until the planning layer closes it out.
    pub fn execution_active(&self) -> bool {
        self.execution_completed_at.is_none()
    }
}
