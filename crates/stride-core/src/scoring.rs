//! Risk scoring of fall risk profiles.
//!
//! The engine only needs a number per profile where lower means less risk.
//! [`TinettiRegression`] is the model in use: a linear regression that
//! predicts the Tinetti gait score (0 to 28, higher is better) from walking
//! speed, stride length and stride frequency.

use crate::{
  indicator::{Indicator, IndicatorName},
  profile::FallRiskProfile,
};

/// Upper bound of the Tinetti gait and balance score.
pub const TINETTI_MAX: f64 = 28.0;

/// Upper bound of the ten-point scale shown to caregivers.
pub const TEN_POINT_MAX: f64 = 10.0;

/// Turns a profile into a risk score. Implementations must be deterministic.
pub trait RiskScorer: Send + Sync {
  /// Lower means lower fall risk.
  fn risk_score(&self, profile: &FallRiskProfile) -> f64;

  /// Model-specific indicators to attach to an assessment of `profile`.
  fn indicators(&self, _profile: &FallRiskProfile) -> Vec<Indicator> { Vec::new() }
}

impl<F> RiskScorer for F
where
  F: Fn(&FallRiskProfile) -> f64 + Send + Sync,
{
  fn risk_score(&self, profile: &FallRiskProfile) -> f64 { self(profile) }
}

// ─── Tinetti regression ──────────────────────────────────────────────────────

/// Linear regression onto the Tinetti score. The coefficients for speed and
/// stride length expect metres, while profiles are recorded in millimetres.
#[derive(Debug, Clone, Copy, Default)]
pub struct TinettiRegression;

impl TinettiRegression {
  pub const WALKING_SPEED_COEFFICIENT: f64 = 29.940;
  pub const STRIDE_LENGTH_COEFFICIENT: f64 = -10.845;
  pub const STRIDE_FREQUENCY_COEFFICIENT: f64 = -7.402;
  pub const Y_INTERCEPT: f64 = 17.133;

  /// The predicted Tinetti score. Not clamped; extreme inputs fall outside
  /// `[0, 28]`.
  pub fn predicted_total(&self, profile: &FallRiskProfile) -> f64 {
    Self::WALKING_SPEED_COEFFICIENT * mm_to_m(profile.walking_speed)
      + Self::STRIDE_LENGTH_COEFFICIENT * mm_to_m(profile.step_length)
      + Self::STRIDE_FREQUENCY_COEFFICIENT * profile.step_frequency
      + Self::Y_INTERCEPT
  }
}

impl RiskScorer for TinettiRegression {
  fn risk_score(&self, profile: &FallRiskProfile) -> f64 {
    TINETTI_MAX - self.predicted_total(profile)
  }

  fn indicators(&self, profile: &FallRiskProfile) -> Vec<Indicator> {
    vec![fall_risk_score(self.predicted_total(profile))]
  }
}

fn mm_to_m(mm: f64) -> f64 { mm / 1000.0 }

/// Map a Tinetti total onto the ten-point scale, rounded to two decimals.
/// Totals above 28 become 10, totals at or below 0 become 0.
pub fn ten_point_scale(total: f64) -> f64 {
  if total > TINETTI_MAX {
    return TEN_POINT_MAX;
  }
  if total <= 0.0 || !total.is_finite() {
    return 0.0;
  }
  (total / TINETTI_MAX * TEN_POINT_MAX * 100.0).round() / 100.0
}

/// The `FallRiskScore` indicator for a Tinetti total.
pub fn fall_risk_score(total: f64) -> Indicator {
  Indicator::new(IndicatorName::FallRiskScore, ten_point_scale(total))
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn profile(speed: f64, length: f64, frequency: f64) -> FallRiskProfile {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    FallRiskProfile {
      profile_id:                Uuid::new_v4(),
      wearable_id:               "W-1".into(),
      floor_id:                  None,
      creation_time:             at,
      begin_time:                at,
      end_time:                  at,
      walking_speed:             speed,
      step_length:               length,
      step_frequency:            frequency,
      rms_vertical_acceleration: None,
      hidden:                    false,
      note:                      None,
      removal:                   None,
    }
  }

  #[test]
  fn faster_walking_is_lower_risk() {
    let model = TinettiRegression;
    let slow = profile(400.0, 700.0, 0.8);
    let fast = profile(1200.0, 700.0, 0.8);
    assert!(model.risk_score(&fast) < model.risk_score(&slow));
  }

  #[test]
  fn total_matches_coefficients() {
    let total = TinettiRegression.predicted_total(&profile(1000.0, 1000.0, 1.0));
    let expected = 29.940 - 10.845 - 7.402 + 17.133;
    assert!((total - expected).abs() < 1e-9);
  }

  #[test]
  fn ten_point_scale_clamps_and_rounds() {
    assert_eq!(ten_point_scale(30.0), 10.0);
    assert_eq!(ten_point_scale(-2.0), 0.0);
    assert_eq!(ten_point_scale(0.0), 0.0);
    assert_eq!(ten_point_scale(14.0), 5.0);
    assert_eq!(ten_point_scale(20.0), 7.14);
  }

  #[test]
  fn closures_are_scorers() {
    let by_speed = |p: &FallRiskProfile| -p.walking_speed;
    assert_eq!(by_speed.risk_score(&profile(3.0, 0.0, 0.0)), -3.0);
    assert!(by_speed.indicators(&profile(3.0, 0.0, 0.0)).is_empty());
  }
}
