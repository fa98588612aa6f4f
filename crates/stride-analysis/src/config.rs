//! Runtime configuration of the analysis service.

use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use stride_core::time::parse_time_zone;

use crate::{Error, Result};

/// How [`BestAssessmentSelector`](crate::best::BestAssessmentSelector) breaks
/// ties between candidate profiles.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionPolicy {
  /// Lowest risk score; ties go to the latest `end_time`.
  #[default]
  LowestRisk,
  /// Latest `end_time`; ties go to the lowest risk score.
  LatestEndTime,
  /// Latest calendar day of `end_time` in the reference time zone, then the
  /// lowest risk score within that day.
  LatestDayLowestRisk,
}

/// Deserialised from the `[analysis]` table of `stride.toml` or from
/// `STRIDE_ANALYSIS__*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
  /// How long a group result stays fresh after it was computed.
  pub cache_ttl_secs:   u64,
  /// IANA name of the zone cache buckets and calendar days are aligned to.
  pub time_zone:        String,
  pub selection_policy: SelectionPolicy,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      cache_ttl_secs:   300,
      time_zone:        "UTC".to_owned(),
      selection_policy: SelectionPolicy::default(),
    }
  }
}

impl AnalysisConfig {
  pub fn time_zone(&self) -> Result<Tz> { Ok(parse_time_zone(&self.time_zone)?) }

  pub fn cache_ttl(&self) -> Result<TimeDelta> {
    i64::try_from(self.cache_ttl_secs)
      .ok()
      .and_then(TimeDelta::try_seconds)
      .ok_or_else(|| Error::Config(format!("cache_ttl_secs out of range: {}", self.cache_ttl_secs)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = AnalysisConfig::default();
    assert_eq!(config.cache_ttl().unwrap(), TimeDelta::minutes(5));
    assert_eq!(config.time_zone().unwrap(), Tz::UTC);
    assert_eq!(config.selection_policy, SelectionPolicy::LowestRisk);
  }

  #[test]
  fn rejects_unknown_zone() {
    let config = AnalysisConfig {
      time_zone: "Nowhere/Special".into(),
      ..AnalysisConfig::default()
    };
    assert!(matches!(config.time_zone(), Err(Error::Core(_))));
  }

  #[test]
  fn rejects_oversized_ttl() {
    let config = AnalysisConfig {
      cache_ttl_secs: u64::MAX,
      ..AnalysisConfig::default()
    };
    assert!(matches!(config.cache_ttl(), Err(Error::Config(_))));
  }

  #[test]
  fn policy_names() {
    assert_eq!(SelectionPolicy::LatestDayLowestRisk.to_string(), "latest_day_lowest_risk");
    assert_eq!("latest_end_time".parse::<SelectionPolicy>().unwrap(), SelectionPolicy::LatestEndTime);
  }
}
