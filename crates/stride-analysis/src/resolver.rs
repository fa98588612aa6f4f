//! Scoping a user's data through their wearable assignments.

use std::collections::HashMap;

use uuid::Uuid;

use stride_core::{
  TimeWindow,
  assignment::WearableAssignment,
  footstep::Footstep,
  interval::{Order, filter_overlapping},
  source::GaitSource,
};

use crate::{Error, Result};

/// Resolves which wearables belonged to a user during a window.
pub struct WearableAssignmentResolver<'a, S> {
  source: &'a S,
}

impl<'a, S: GaitSource> WearableAssignmentResolver<'a, S> {
  pub fn new(source: &'a S) -> Self { Self { source } }

  /// Assignments of `user_id` overlapping `window`, most recent first.
  pub async fn assignments(
    &self,
    user_id: Uuid,
    window: TimeWindow,
  ) -> Result<Vec<WearableAssignment>> {
    if window.is_inverted() {
      return Ok(Vec::new());
    }
    let fetched = self
      .source
      .wearable_assignments(user_id, window)
      .await
      .map_err(Error::from_source)?;
    Ok(filter_overlapping(&window, fetched, Order::Descending, None))
  }

  /// Every footstep recorded by one of the user's wearables while it was
  /// assigned to them, restricted to `window` and ordered by time.
  pub async fn footsteps_for_user(&self, user_id: Uuid, window: TimeWindow) -> Result<Vec<Footstep>> {
    // One query per wearable over the union of its clipped periods, then
    // drop the steps that fall between two of its assignments.
    let mut periods: HashMap<String, Vec<TimeWindow>> = HashMap::new();
    for assignment in self.assignments(user_id, window).await? {
      if let Some(clipped) = assignment.clip_to(&window) {
        periods.entry(assignment.wearable_id).or_default().push(clipped);
      }
    }

    let mut footsteps = Vec::new();
    for (wearable_id, clipped) in periods {
      let Some(hull) = hull(&clipped) else { continue };
      let ids = [wearable_id];
      let fetched = self
        .source
        .footsteps(&ids, hull)
        .await
        .map_err(Error::from_source)?;
      footsteps.extend(
        fetched
          .into_iter()
          .filter(|f| clipped.iter().any(|period| period.contains(f.time))),
      );
    }

    footsteps.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.wearable_id.cmp(&b.wearable_id)));
    tracing::debug!(%user_id, count = footsteps.len(), "resolved user footsteps");
    Ok(footsteps)
  }
}

/// The smallest window covering all of `periods`.
fn hull(periods: &[TimeWindow]) -> Option<TimeWindow> {
  let begin = periods.iter().map(|p| p.begin).min()?;
  let end = periods.iter().map(|p| p.end).max()?;
  Some(TimeWindow::new(begin, end))
}
