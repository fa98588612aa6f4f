//! Fall risk profiles (FRPs) and their administrative annotations.
//!
//! An FRP summarises the gait indicators of one wearable over the span of
//! footsteps `[begin_time, end_time]` it was computed from. It is produced by
//! an external ingestion process; afterwards it may be hidden, annotated with
//! a note, or removed. Removed profiles are kept for audit but never surface
//! in non-administrative views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  footstep::Footstep,
  indicator::{average_speed, average_stride_frequency, average_stride_length},
  interval::Interval,
  time::TimeWindow,
};

// ─── Annotations ─────────────────────────────────────────────────────────────

/// A free-text remark attached to an FRP by a caregiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub value:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
  pub created_by: Uuid,
}

/// Why an FRP was removed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemovalReason {
  /// The measurement protocol was not followed.
  Protocol,
  Duplicate,
  /// A sensor malfunctioned.
  Sensor,
  Application,
  Other,
}

/// Records that an FRP was withdrawn. At most one per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
  pub reason:              RemovalReason,
  /// Free-text detail, expected when `reason` is [`RemovalReason::Other`].
  pub specification_other: Option<String>,
  pub removed_by:          Uuid,
  pub removed_at:          DateTime<Utc>,
}

// ─── FallRiskProfile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallRiskProfile {
  pub profile_id:                Uuid,
  pub wearable_id:               String,
  pub floor_id:                  Option<Uuid>,
  /// When the FRP record was produced; may be well after `end_time`.
  pub creation_time:             DateTime<Utc>,
  /// Time of the first footstep the FRP is based on.
  pub begin_time:                DateTime<Utc>,
  /// Time of the last footstep the FRP is based on.
  pub end_time:                  DateTime<Utc>,
  /// mm/s
  pub walking_speed:             f64,
  /// Stride length in mm.
  pub step_length:               f64,
  /// Strides per second.
  pub step_frequency:            f64,
  /// m/s², not recorded by every floor.
  pub rms_vertical_acceleration: Option<f64>,
  pub hidden:                    bool,
  pub note:                      Option<Note>,
  pub removal:                   Option<Removal>,
}

impl FallRiskProfile {
  /// The footstep span `[begin_time, end_time]`.
  pub fn span(&self) -> TimeWindow { TimeWindow::new(self.begin_time, self.end_time) }

  pub fn is_removed(&self) -> bool { self.removal.is_some() }

  /// Derive an unsaved FRP from raw footsteps. Only positioned footsteps are
  /// used. When `window` is given it replaces the footstep span both as the
  /// profile span and as the elapsed time for speed and frequency.
  ///
  /// The returned profile has a nil `profile_id` and its `creation_time`
  /// equals its `begin_time`. Returns `None` when no footstep has a position.
  pub fn from_footsteps(footsteps: &[Footstep], window: Option<&TimeWindow>) -> Option<Self> {
    let used: Vec<Footstep> = footsteps.iter().filter(|f| f.has_position()).cloned().collect();
    let first = used.first()?;
    let last = used.last()?;
    let span = window.copied().unwrap_or(TimeWindow::new(first.time, last.time));

    Some(Self {
      profile_id:                Uuid::nil(),
      wearable_id:               first.wearable_id.clone(),
      floor_id:                  first.floor_id,
      creation_time:             span.begin,
      begin_time:                span.begin,
      end_time:                  span.end,
      walking_speed:             average_speed(&used, window).value,
      step_length:               average_stride_length(&used).value,
      step_frequency:            average_stride_frequency(&used, window).value,
      rms_vertical_acceleration: None,
      hidden:                    false,
      note:                      None,
      removal:                   None,
    })
  }
}

impl Interval for FallRiskProfile {
  fn interval_begin(&self) -> DateTime<Utc> { self.begin_time }

  fn interval_end(&self) -> Option<DateTime<Utc>> { Some(self.end_time) }
}

// ─── NewFallRiskProfile ──────────────────────────────────────────────────────

/// Input for persisting a freshly computed FRP. Identity is assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFallRiskProfile {
  pub wearable_id:               String,
  pub floor_id:                  Option<Uuid>,
  pub creation_time:             DateTime<Utc>,
  pub begin_time:                DateTime<Utc>,
  pub end_time:                  DateTime<Utc>,
  pub walking_speed:             f64,
  pub step_length:               f64,
  pub step_frequency:            f64,
  pub rms_vertical_acceleration: Option<f64>,
  pub hidden:                    bool,
}

impl NewFallRiskProfile {
  /// Reject spans that end before they begin.
  pub fn validate(&self) -> Result<()> {
    if self.begin_time > self.end_time {
      return Err(Error::InvalidProfileSpan {
        begin: self.begin_time,
        end:   self.end_time,
      });
    }
    Ok(())
  }

  /// Attach a store-assigned identity.
  pub fn into_profile(self, profile_id: Uuid) -> FallRiskProfile {
    FallRiskProfile {
      profile_id,
      wearable_id: self.wearable_id,
      floor_id: self.floor_id,
      creation_time: self.creation_time,
      begin_time: self.begin_time,
      end_time: self.end_time,
      walking_speed: self.walking_speed,
      step_length: self.step_length,
      step_frequency: self.step_frequency,
      rms_vertical_acceleration: self.rms_vertical_acceleration,
      hidden: self.hidden,
      note: None,
      removal: None,
    }
  }
}
