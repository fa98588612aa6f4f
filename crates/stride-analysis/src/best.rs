//! Picking the single best assessment of a user.

use std::cmp::Ordering;

use chrono::NaiveDate;
use chrono_tz::Tz;
use uuid::Uuid;

use stride_core::{
  TimeWindow, assessment::Assessment, profile::FallRiskProfile, scoring::RiskScorer,
};

use crate::config::SelectionPolicy;

pub struct BestAssessmentSelector<'a> {
  scorer:    &'a dyn RiskScorer,
  policy:    SelectionPolicy,
  time_zone: Tz,
}

impl<'a> BestAssessmentSelector<'a> {
  pub fn new(scorer: &'a dyn RiskScorer, policy: SelectionPolicy, time_zone: Tz) -> Self {
    Self { scorer, policy, time_zone }
  }

  /// The best of `candidates` whose `end_time` lies in `window`, as a
  /// [`Latest`](stride_core::assessment::AssessmentKind::Latest) assessment
  /// for `user_id`. Hidden and removed candidates never win.
  pub fn select(
    &self,
    user_id: Uuid,
    window: &TimeWindow,
    candidates: Vec<FallRiskProfile>,
  ) -> Option<Assessment> {
    candidates
      .into_iter()
      .filter(|p| !p.hidden && !p.is_removed() && window.contains(p.end_time))
      .map(|p| Assessment::scored(p, self.scorer))
      .max_by(|a, b| self.compare(a, b))
      .map(|best| best.into_latest(user_id))
  }

  /// `Greater` when `a` is the better assessment.
  fn compare(&self, a: &Assessment, b: &Assessment) -> Ordering {
    let lower_risk = risk(b).total_cmp(&risk(a));
    let later_end = a.profile.end_time.cmp(&b.profile.end_time);
    match self.policy {
      SelectionPolicy::LowestRisk => lower_risk.then(later_end),
      SelectionPolicy::LatestEndTime => later_end.then(lower_risk),
      SelectionPolicy::LatestDayLowestRisk => self
        .end_day(a)
        .cmp(&self.end_day(b))
        .then(lower_risk)
        .then(later_end),
    }
  }

  fn end_day(&self, assessment: &Assessment) -> NaiveDate {
    assessment.profile.end_time.with_timezone(&self.time_zone).date_naive()
  }
}

fn risk(assessment: &Assessment) -> f64 { assessment.score.unwrap_or(f64::INFINITY) }
