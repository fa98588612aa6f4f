//! Fall risk assessments, the read model handed to callers.
//!
//! An [`Assessment`] wraps a [`FallRiskProfile`] together with the indicators
//! shown for it. Its [`AssessmentKind`] records how it was produced: a plain
//! listing, a listing with a risk score, or the latest best assessment of a
//! user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  indicator::{Indicator, IndicatorName},
  profile::{FallRiskProfile, Note},
  scoring::RiskScorer,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssessmentKind {
  /// A listed profile, no score attached.
  Profile,
  /// A listed profile with its risk score.
  Scored,
  /// The best recent assessment of a user.
  Latest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
  pub kind:       AssessmentKind,
  /// Set for [`AssessmentKind::Latest`].
  pub user_id:    Option<Uuid>,
  pub profile:    FallRiskProfile,
  pub indicators: Vec<Indicator>,
  /// Lower is less risk. Absent for [`AssessmentKind::Profile`].
  pub score:      Option<f64>,
}

impl Assessment {
  /// An unscored assessment showing the profile's own gait indicators.
  pub fn of_profile(profile: FallRiskProfile) -> Self {
    Self {
      kind: AssessmentKind::Profile,
      user_id: None,
      indicators: profile_indicators(&profile),
      profile,
      score: None,
    }
  }

  /// An assessment scored by `scorer`, carrying its model indicators after
  /// the gait indicators.
  pub fn scored(profile: FallRiskProfile, scorer: &dyn RiskScorer) -> Self {
    let mut indicators = profile_indicators(&profile);
    indicators.extend(scorer.indicators(&profile));
    Self {
      kind: AssessmentKind::Scored,
      user_id: None,
      score: Some(scorer.risk_score(&profile)),
      indicators,
      profile,
    }
  }

  /// Mark this assessment as the latest best one for `user_id`.
  pub fn into_latest(self, user_id: Uuid) -> Self {
    Self {
      kind: AssessmentKind::Latest,
      user_id: Some(user_id),
      ..self
    }
  }

  pub fn note(&self) -> Option<&Note> { self.profile.note.as_ref() }
}

/// The stored gait indicators of a profile.
pub fn profile_indicators(profile: &FallRiskProfile) -> Vec<Indicator> {
  vec![
    Indicator::new(IndicatorName::AverageSpeed, profile.walking_speed),
    Indicator::new(IndicatorName::AverageStrideLength, profile.step_length),
    Indicator::new(IndicatorName::AverageStrideFrequency, profile.step_frequency),
  ]
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::scoring::TinettiRegression;

  fn profile() -> FallRiskProfile {
    let at = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();
    FallRiskProfile {
      profile_id:                Uuid::new_v4(),
      wearable_id:               "W-9".into(),
      floor_id:                  None,
      creation_time:             at,
      begin_time:                at,
      end_time:                  at,
      walking_speed:             900.0,
      step_length:               650.0,
      step_frequency:            1.1,
      rms_vertical_acceleration: None,
      hidden:                    false,
      note:                      None,
      removal:                   None,
    }
  }

  #[test]
  fn plain_assessment_has_no_score() {
    let assessment = Assessment::of_profile(profile());
    assert_eq!(assessment.kind, AssessmentKind::Profile);
    assert_eq!(assessment.score, None);
    let names: Vec<_> = assessment.indicators.iter().map(|i| i.name).collect();
    assert_eq!(names, [
      IndicatorName::AverageSpeed,
      IndicatorName::AverageStrideLength,
      IndicatorName::AverageStrideFrequency,
    ]);
  }

  #[test]
  fn scored_assessment_appends_model_indicators() {
    let assessment = Assessment::scored(profile(), &TinettiRegression);
    assert_eq!(assessment.kind, AssessmentKind::Scored);
    assert!(assessment.score.is_some());
    assert_eq!(assessment.indicators.last().map(|i| i.name), Some(IndicatorName::FallRiskScore));
  }

  #[test]
  fn latest_carries_user() {
    let user = Uuid::new_v4();
    let latest = Assessment::scored(profile(), &TinettiRegression).into_latest(user);
    assert_eq!(latest.kind, AssessmentKind::Latest);
    assert_eq!(latest.user_id, Some(user));
    assert!(latest.note().is_none());
  }

  #[test]
  fn missing_note_serialises_as_null() {
    let json = serde_json::to_value(Assessment::of_profile(profile())).unwrap();
    assert!(json["profile"]["note"].is_null());
  }
}
