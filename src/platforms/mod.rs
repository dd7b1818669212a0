//! # Platform Deployment Adapters
//!
//! Translates abstract campaign configuration into each ad platform's native
//! object graph. The set of supported platforms is a closed enum so an
//! unsupported platform name is a single-point runtime check instead of
//! scattered string branching.

pub mod adapter;
pub mod client;
pub mod google_ads;
pub mod linkedin;
pub mod meta;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use adapter::{AdapterRegistry, DeploymentAdapter, DeploymentContext};
pub use client::{
    AdGroupSpec, AdSpec, CampaignSpec, DateRange, PlatformApiError, PlatformClient,
    PlatformConnection,
};
pub use google_ads::GoogleAdsAdapter;
pub use linkedin::LinkedInAdapter;
pub use meta::MetaAdapter;

/// A supported ad platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Meta,
    GoogleAds,
    LinkedIn,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Meta, Platform::GoogleAds, Platform::LinkedIn];

    /// Human-facing name, used in error messages and notifications.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Meta => "Meta",
            Self::GoogleAds => "Google Ads",
            Self::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta => write!(f, "meta"),
            Self::GoogleAds => write!(f, "google_ads"),
            Self::LinkedIn => write!(f, "linkedin"),
        }
    }
}

/// Error for platform names outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported platform: {0}")]
pub struct UnsupportedPlatform(pub String);

impl std::str::FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" => Ok(Self::Meta),
            "google_ads" => Ok(Self::GoogleAds),
            "linkedin" => Ok(Self::LinkedIn),
            _ => Err(UnsupportedPlatform(s.to_string())),
        }
    }
}
