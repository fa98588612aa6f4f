//! Fall risk profile selection for a wearable or a user.

use std::collections::HashSet;

use uuid::Uuid;

use stride_core::{
  TimeWindow,
  assessment::Assessment,
  interval::{contained_in, overlaps},
  profile::FallRiskProfile,
  scoring::RiskScorer,
  source::GaitSource,
};

use crate::{Error, Result, resolver::WearableAssignmentResolver};

/// Selects the non-removed profiles visible for a query, ordered by
/// `creation_time` ascending and decorated with their notes.
pub struct FallRiskProfileSelector<'a, S> {
  source: &'a S,
}

impl<'a, S: GaitSource> FallRiskProfileSelector<'a, S> {
  pub fn new(source: &'a S) -> Self { Self { source } }

  /// Profiles of `wearable_id` created within `window`.
  pub async fn for_wearable(
    &self,
    wearable_id: &str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<FallRiskProfile>> {
    if window.is_inverted() {
      return Ok(Vec::new());
    }
    let fetched = self
      .source
      .fall_risk_profiles(wearable_id, window, include_hidden)
      .await
      .map_err(Error::from_source)?;
    let kept = fetched
      .into_iter()
      .filter(|p| visible(p, include_hidden) && window.contains(p.creation_time))
      .collect();
    self.finish(kept).await
  }

  /// Profiles recorded while one of the user's wearables was assigned to
  /// them. A profile qualifies when its footstep span lies inside the
  /// assignment and overlaps `window`.
  pub async fn for_user(
    &self,
    user_id: Uuid,
    window: TimeWindow,
    include_hidden: bool,
  ) -> Result<Vec<FallRiskProfile>> {
    let assignments = WearableAssignmentResolver::new(self.source)
      .assignments(user_id, window)
      .await?;

    let mut kept = Vec::new();
    for assignment in &assignments {
      let Some(clipped) = assignment.clip_to(&window) else { continue };
      let fetched = self
        .source
        .fall_risk_profiles_spanning(&assignment.wearable_id, clipped, include_hidden)
        .await
        .map_err(Error::from_source)?;
      kept.extend(fetched.into_iter().filter(|p| {
        visible(p, include_hidden) && contained_in(assignment, p) && overlaps(&window, p)
      }));
    }

    tracing::debug!(
      %user_id,
      assignments = assignments.len(),
      profiles = kept.len(),
      "selected user profiles"
    );
    self.finish(kept).await
  }

  async fn finish(&self, mut profiles: Vec<FallRiskProfile>) -> Result<Vec<FallRiskProfile>> {
    let mut seen = HashSet::new();
    profiles.retain(|p| seen.insert(p.profile_id));
    profiles.sort_by(|a, b| {
      a.creation_time
        .cmp(&b.creation_time)
        .then_with(|| a.begin_time.cmp(&b.begin_time))
    });

    for profile in &mut profiles {
      profile.note = self
        .source
        .note(profile.profile_id)
        .await
        .map_err(Error::from_source)?;
    }
    Ok(profiles)
  }
}

fn visible(profile: &FallRiskProfile, include_hidden: bool) -> bool {
  !profile.is_removed() && (include_hidden || !profile.hidden)
}

/// Score every profile with `scorer`, keeping their order.
pub fn assess(profiles: Vec<FallRiskProfile>, scorer: &dyn RiskScorer) -> Vec<Assessment> {
  profiles
    .into_iter()
    .map(|profile| Assessment::scored(profile, scorer))
    .collect()
}
