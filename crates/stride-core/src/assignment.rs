//! Wearable assignments: the periods during which a wearable belonged to a
//! user.
//!
//! Assignments are never deleted. Unlinking a wearable closes the open
//! assignment by setting its end time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{interval::Interval, time::TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WearableAssignment {
  pub assignment_id: Uuid,
  pub user_id:       Uuid,
  pub wearable_id:   String,
  pub begin_time:    DateTime<Utc>,
  /// `None` while the wearable is still assigned.
  pub end_time:      Option<DateTime<Utc>>,
}

impl WearableAssignment {
  pub fn is_active(&self) -> bool { self.end_time.is_none() }

  /// The part of this assignment that falls inside `window`, or `None` when
  /// the two do not overlap.
  pub fn clip_to(&self, window: &TimeWindow) -> Option<TimeWindow> {
    let end = self.end_time.unwrap_or(window.end);
    TimeWindow::new(self.begin_time, end).intersect(window)
  }
}

impl Interval for WearableAssignment {
  fn interval_begin(&self) -> DateTime<Utc> { self.begin_time }

  fn interval_end(&self) -> Option<DateTime<Utc>> { self.end_time }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn assignment(begin: DateTime<Utc>, end: Option<DateTime<Utc>>) -> WearableAssignment {
    WearableAssignment {
      assignment_id: Uuid::new_v4(),
      user_id:       Uuid::new_v4(),
      wearable_id:   "W-1".into(),
      begin_time:    begin,
      end_time:      end,
    }
  }

  #[test]
  fn open_assignment_clips_to_window_end() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let a = assignment(now - Duration::days(3), None);
    let window = TimeWindow::new(now - Duration::days(1), now);
    assert!(a.is_active());
    assert_eq!(a.clip_to(&window), Some(window));
  }

  #[test]
  fn closed_assignment_before_window_does_not_clip() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let a = assignment(now - Duration::days(3), Some(now - Duration::days(2)));
    let window = TimeWindow::new(now - Duration::days(1), now);
    assert_eq!(a.clip_to(&window), None);
  }
}
