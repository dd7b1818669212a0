use crate::error::{CampaignCoreError, Result};

/// Retry and backoff behavior for failed executions.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum business-level retries before a schedule is terminally failed
    pub max_retries: u32,
    /// Base delay in minutes; doubles with each retry
    pub base_delay_minutes: u32,
    /// Upper bound on any computed delay, jitter included
    pub max_delay_minutes: u32,
    /// Maximum uniform jitter added to each delay, in minutes
    pub max_jitter_minutes: u32,
    /// Schedules older than this are never retried
    pub max_schedule_age_hours: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_minutes: 5,
            max_delay_minutes: 65,
            max_jitter_minutes: 5,
            max_schedule_age_hours: 24,
        }
    }
}

/// Deployment fan-out behavior.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Per-platform call budget; a timeout counts as a deployment failure
    pub platform_call_timeout_seconds: u64,
    /// Whether >=1 successful platform is enough to complete a schedule
    pub accept_partial_success: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            platform_call_timeout_seconds: 30,
            accept_partial_success: true,
        }
    }
}

/// Performance monitoring thresholds and cadence defaults.
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Interval used when a schedule's rules don't specify one, in seconds
    pub default_interval_seconds: u64,
    /// CTR below this fraction triggers optimization (e.g. 0.01 = 1%)
    pub ctr_floor: f64,
    /// CPC above this many minor currency units triggers optimization
    pub cpc_ceiling_minor_units: i64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            default_interval_seconds: 1800,
            ctr_floor: 0.01,
            cpc_ceiling_minor_units: 500,
        }
    }
}

/// Top-level configuration for the campaign execution core.
#[derive(Debug, Clone, Default)]
pub struct CampaignCoreConfig {
    pub retry: RetryConfig,
    pub deployment: DeploymentConfig,
    pub monitoring: MonitoringConfig,
}

impl CampaignCoreConfig {
    /// Build configuration from defaults with environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max_retries) = std::env::var("CAMPAIGN_MAX_RETRIES") {
            config.retry.max_retries = max_retries.parse().map_err(|e| {
                CampaignCoreError::Configuration(format!("Invalid max_retries: {e}"))
            })?;
        }

        if let Ok(base_delay) = std::env::var("CAMPAIGN_RETRY_BASE_DELAY_MINUTES") {
            config.retry.base_delay_minutes = base_delay.parse().map_err(|e| {
                CampaignCoreError::Configuration(format!("Invalid base_delay_minutes: {e}"))
            })?;
        }

        if let Ok(timeout) = std::env::var("CAMPAIGN_PLATFORM_TIMEOUT_SECONDS") {
            config.deployment.platform_call_timeout_seconds = timeout.parse().map_err(|e| {
                CampaignCoreError::Configuration(format!(
                    "Invalid platform_call_timeout_seconds: {e}"
                ))
            })?;
        }

        if let Ok(interval) = std::env::var("CAMPAIGN_MONITORING_INTERVAL_SECONDS") {
            config.monitoring.default_interval_seconds = interval.parse().map_err(|e| {
                CampaignCoreError::Configuration(format!("Invalid default_interval_seconds: {e}"))
            })?;
        }

        Ok(config)
    }
}
