//! Time windows and the bucketing function used for cache keys.
//!
//! A [`TimeWindow`] is the unit every query is expressed in. It is a closed
//! interval `[begin, end]`. The type does not reject `begin > end`; such an
//! inverted window simply matches nothing.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, footstep::Footstep};

/// Width of the buckets that group-level cache keys are rounded into.
pub const CACHE_BUCKET_MINUTES: u32 = 5;

// ─── TimeWindow ──────────────────────────────────────────────────────────────

/// A closed interval `[begin, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
  pub begin: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl TimeWindow {
  pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self { Self { begin, end } }

  /// A zero-length window covering a single instant.
  pub fn instant(at: DateTime<Utc>) -> Self { Self { begin: at, end: at } }

  pub fn is_inverted(&self) -> bool { self.begin > self.end }

  /// Signed length of the window in seconds, at microsecond resolution.
  /// Negative for inverted windows.
  pub fn duration_secs(&self) -> f64 {
    let length = self.end - self.begin;
    match length.num_microseconds() {
      Some(micros) => micros as f64 / 1_000_000.0,
      // Spans beyond ~292k years only fit in milliseconds.
      None => length.num_milliseconds() as f64 / 1000.0,
    }
  }

  /// Whether `at` lies in `[begin, end]`.
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.begin <= at && at <= self.end
  }

  /// The overlapping part of two windows, or `None` when they are disjoint
  /// or either one is inverted.
  pub fn intersect(&self, other: &TimeWindow) -> Option<TimeWindow> {
    if self.is_inverted() || other.is_inverted() {
      return None;
    }
    let begin = self.begin.max(other.begin);
    let end = self.end.min(other.end);
    (begin <= end).then_some(TimeWindow { begin, end })
  }

  /// The window spanning the first to the last footstep of a time-ordered
  /// sequence. `None` for an empty sequence.
  pub fn from_footsteps(footsteps: &[Footstep]) -> Option<Self> {
    let first = footsteps.first()?;
    let last = footsteps.last()?;
    Some(Self::new(first.time, last.time))
  }
}

// ─── Bucketing ───────────────────────────────────────────────────────────────

/// Round `at` down to the nearest `minutes`-wide boundary as seen on a wall
/// clock in `tz`. Minutes below the boundary, seconds and sub-seconds are
/// zeroed. `minutes` is expected to divide an hour evenly.
pub fn floor_to_bucket(at: DateTime<Utc>, tz: Tz, minutes: u32) -> DateTime<Utc> {
  let minutes = minutes.max(1);
  let local = at.with_timezone(&tz);
  let excess = Duration::minutes(i64::from(local.minute() % minutes))
    + Duration::seconds(i64::from(local.second()))
    + Duration::nanoseconds(i64::from(local.nanosecond()));
  at - excess
}

/// [`floor_to_bucket`] with the cache bucket width of five minutes.
pub fn floor_five_minutes(at: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
  floor_to_bucket(at, tz, CACHE_BUCKET_MINUTES)
}

/// Parse an IANA time zone name such as `"Europe/Amsterdam"`.
pub fn parse_time_zone(name: &str) -> Result<Tz> {
  name
    .parse::<Tz>()
    .map_err(|_| Error::UnknownTimeZone(name.to_owned()))
}
