//! Time-bucketed, single-flight cache for group-level results.
//!
//! Keys round the window end down to a five-minute boundary, so repeated
//! dashboard refreshes within one bucket share a single computation. Each key
//! owns an async mutex: concurrent callers for the same key wait for the one
//! in flight, callers for other keys never wait on each other. Failed
//! computations leave no entry behind. Expired entries are swept on a miss,
//! at most once per TTL.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use stride_core::{TimeWindow, time::floor_five_minutes};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current time for TTL checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}

// ─── Key ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub group_id:   Uuid,
  pub begin:      DateTime<Utc>,
  /// `window.end` floored to five minutes in the reference zone.
  pub bucket_end: DateTime<Utc>,
}

impl CacheKey {
  pub fn new(group_id: Uuid, window: &TimeWindow, time_zone: Tz) -> Self {
    Self {
      group_id,
      begin: window.begin,
      bucket_end: floor_five_minutes(window.end, time_zone),
    }
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

struct Cached<V> {
  value:       V,
  computed_at: DateTime<Utc>,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<Cached<V>>>>;

pub struct BucketedCache<V, C = SystemClock> {
  slots:      Mutex<HashMap<CacheKey, Slot<V>>>,
  ttl:        TimeDelta,
  clock:      C,
  last_sweep: Mutex<DateTime<Utc>>,
}

impl<V, C> BucketedCache<V, C>
where
  V: Clone + Send,
  C: Clock,
{
  pub fn new(ttl: TimeDelta, clock: C) -> Self {
    let last_sweep = Mutex::new(clock.now());
    Self {
      slots: Mutex::new(HashMap::new()),
      ttl,
      clock,
      last_sweep,
    }
  }

  pub fn ttl(&self) -> TimeDelta { self.ttl }

  /// The outer lock only guards map access and is never held across an
  /// `.await`, so a poisoned map is still consistent.
  fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Slot<V>>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn slot(&self, key: CacheKey) -> Slot<V> { self.slots().entry(key).or_default().clone() }

  fn is_fresh(&self, cached: &Cached<V>, now: DateTime<Utc>) -> bool {
    now < cached.computed_at + self.ttl
  }

  /// Run [`purge_expired`](Self::purge_expired) when a full TTL has passed
  /// since the previous sweep.
  fn sweep_if_due(&self, now: DateTime<Utc>) {
    {
      let mut last = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
      if now < *last + self.ttl {
        return;
      }
      *last = now;
    }
    self.purge_expired();
  }

  /// Return the fresh value stored under `key`, or run `compute` and store
  /// its result. Errors are returned to this caller only and not stored.
  pub async fn get_or_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<V, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    let slot = self.slot(key);
    let mut entry = slot.lock().await;

    if let Some(cached) = entry.as_ref()
      && self.is_fresh(cached, self.clock.now())
    {
      tracing::debug!(group_id = %key.group_id, bucket_end = %key.bucket_end, "cache hit");
      return Ok(cached.value.clone());
    }

    tracing::debug!(group_id = %key.group_id, bucket_end = %key.bucket_end, "cache miss");
    self.sweep_if_due(self.clock.now());
    match compute().await {
      Ok(value) => {
        *entry = Some(Cached {
          value:       value.clone(),
          computed_at: self.clock.now(),
        });
        tracing::debug!(group_id = %key.group_id, "cached group result");
        Ok(value)
      }
      Err(err) => {
        *entry = None;
        tracing::warn!(group_id = %key.group_id, "group computation failed; not cached");
        Err(err)
      }
    }
  }

  /// Drop expired and empty entries. Entries another task is using are kept.
  pub fn purge_expired(&self) -> usize {
    let now = self.clock.now();
    let mut slots = self.slots();
    let before = slots.len();
    slots.retain(|_, slot| {
      if Arc::strong_count(slot) > 1 {
        return true;
      }
      match slot.try_lock() {
        Ok(entry) => entry.as_ref().is_some_and(|cached| self.is_fresh(cached, now)),
        Err(_) => true,
      }
    });
    let purged = before - slots.len();
    if purged > 0 {
      tracing::debug!(purged, "purged expired cache entries");
    }
    purged
  }

  pub fn clear(&self) { self.slots().clear(); }

  /// Number of keys currently tracked, fresh or not.
  pub fn len(&self) -> usize { self.slots().len() }

  pub fn is_empty(&self) -> bool { self.slots().is_empty() }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 9, h, m, s).unwrap()
  }

  #[test]
  fn keys_within_a_bucket_are_equal() {
    let group = Uuid::new_v4();
    let a = CacheKey::new(group, &TimeWindow::new(at(8, 0, 0), at(12, 1, 10)), Tz::UTC);
    let b = CacheKey::new(group, &TimeWindow::new(at(8, 0, 0), at(12, 4, 59)), Tz::UTC);
    let c = CacheKey::new(group, &TimeWindow::new(at(8, 0, 0), at(12, 5, 0)), Tz::UTC);
    assert_eq!(a, b);
    assert_ne!(b, c);
  }

  #[test]
  fn keys_keep_exact_begin_and_group() {
    let window = TimeWindow::new(at(8, 0, 0), at(12, 0, 0));
    let shifted = TimeWindow::new(at(8, 0, 1), at(12, 0, 0));
    let group = Uuid::new_v4();
    assert_ne!(CacheKey::new(group, &window, Tz::UTC), CacheKey::new(group, &shifted, Tz::UTC));
    assert_ne!(
      CacheKey::new(group, &window, Tz::UTC),
      CacheKey::new(Uuid::new_v4(), &window, Tz::UTC)
    );
  }
}
