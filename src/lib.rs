#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Campaign Core Rust
//!
//! Execution core for scheduled multi-platform ad campaign launches.
//!
//! ## Overview
//!
//! An approved campaign plan is turned into live (but paused) campaign
//! structures on one or more advertising platforms at a scheduled time. The
//! crate owns the schedule lifecycle: window-gated triggering, per-platform
//! deployment fan-out, bounded retries with exponential backoff, post-launch
//! monitoring and optimization, rollback and emergency stop.
//!
//! Every unit of work is an independent task dispatched through a durable job
//! queue the embedding application provides; there are no long-lived loops.
//! Persistence, credentials and mail delivery are likewise collaborator
//! traits ([`stores`]), so the core stays testable without infrastructure.
//!
//! ## Module Organization
//!
//! - [`models`] - Campaign plans, execution schedules, deployment results
//! - [`state_machine`] - Schedule status lifecycle and transitions
//! - [`window`] - Timezone-aware execution window evaluation
//! - [`platforms`] - Platform adapters and the deployment contract
//! - [`orchestration`] - Executor, fan-out, retry, monitoring, rollback
//! - [`jobs`] - Durable job queue interface
//! - [`stores`] - Persistence and notification collaborator traits
//! - [`config`] - Configuration with environment overrides
//! - [`error`] - Structured error handling

pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod platforms;
pub mod state_machine;
pub mod stores;
pub mod window;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use config::CampaignCoreConfig;
pub use error::{CampaignCoreError, Result};
pub use orchestration::{CampaignExecutionService, ExecutionOutcome, ScheduleRequest};
pub use state_machine::ScheduleStatus;
