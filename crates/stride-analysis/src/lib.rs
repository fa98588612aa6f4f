//! Fall risk selection on top of a [`GaitSource`](stride_core::source::GaitSource).
//!
//! [`AnalysisService`] is the facade: it resolves a user's wearables, selects
//! their fall risk profiles, picks the best assessment, and caches group
//! results in five-minute buckets. The footstep calculators are re-exported
//! from `stride-core` for callers that already hold footsteps.

pub mod best;
pub mod cache;
pub mod config;
pub mod error;
pub mod profiles;
pub mod resolver;
pub mod service;

pub use best::BestAssessmentSelector;
pub use cache::{BucketedCache, CacheKey, Clock, SystemClock};
pub use config::{AnalysisConfig, SelectionPolicy};
pub use error::{Error, Result};
pub use profiles::FallRiskProfileSelector;
pub use resolver::WearableAssignmentResolver;
pub use service::AnalysisService;
pub use stride_core::indicator::{
  average_speed, average_stride_frequency, average_stride_length, covered_distance,
  first_to_last_step_distance, footstep_indicators, walking_time,
};
