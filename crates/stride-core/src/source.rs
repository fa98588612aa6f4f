//! The `GaitSource` trait, the read-only view of the measurement store.
//!
//! The analysis engine depends on this abstraction, not on a concrete
//! backend. Implementations (e.g. `stride-store-sqlite`) answer simple
//! time-window queries; selection, ordering and deduplication happen above
//! them.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assignment::WearableAssignment,
  footstep::Footstep,
  profile::{FallRiskProfile, Note},
  time::TimeWindow,
};

/// Read access to footsteps, wearable assignments and fall risk profiles.
///
/// Every method treats an inverted window as matching nothing. Removed
/// profiles are never returned, and profiles come back without their note;
/// notes are fetched separately through [`GaitSource::note`].
///
/// All methods return `Send` futures so a source can be shared across tasks
/// of a multi-threaded runtime.
pub trait GaitSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Footsteps of any of `wearable_ids` with a time inside `window`, ordered
  /// by time ascending.
  fn footsteps<'a>(
    &'a self,
    wearable_ids: &'a [String],
    window: TimeWindow,
  ) -> impl Future<Output = Result<Vec<Footstep>, Self::Error>> + Send + 'a;

  /// Assignments of `user_id` overlapping `window`, open-ended ones
  /// included. Order is unspecified.
  fn wearable_assignments(
    &self,
    user_id: Uuid,
    window: TimeWindow,
  ) -> impl Future<Output = Result<Vec<WearableAssignment>, Self::Error>> + Send + '_;

  /// Profiles of `wearable_id` whose `creation_time` lies inside `window`,
  /// ordered by `creation_time` ascending. Hidden profiles are only
  /// returned when `include_hidden` is set.
  fn fall_risk_profiles<'a>(
    &'a self,
    wearable_id: &'a str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> impl Future<Output = Result<Vec<FallRiskProfile>, Self::Error>> + Send + 'a;

  /// Profiles of `wearable_id` whose footstep span overlaps `window`,
  /// ordered by `begin_time` descending.
  fn fall_risk_profiles_spanning<'a>(
    &'a self,
    wearable_id: &'a str,
    window: TimeWindow,
    include_hidden: bool,
  ) -> impl Future<Output = Result<Vec<FallRiskProfile>, Self::Error>> + Send + 'a;

  /// The note attached to a profile, if any.
  fn note(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;
}
