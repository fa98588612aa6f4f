//! Interval overlap matching.
//!
//! Let `R = [b, e]` be the reference window and `C = [b', e']` a candidate,
//! where an absent `e'` means the candidate is still ongoing. `C` matches `R`
//! when `b <= e'` and `e >= b'`. That pair of inequalities covers all four
//! ways two intervals can touch:
//!
//! ```text
//! [----|----|----]   C inside R
//! [------|---]--|    C starts inside R
//! |--[---|------]    C ends inside R
//! |--[------]---|    R inside C
//! ```
//!
//! and rejects candidates entirely before or after `R`. An inverted reference
//! (`b > e`) matches nothing; it is never swapped.

use chrono::{DateTime, Utc};

use crate::time::TimeWindow;

/// Anything with a begin time and an optional (open-ended) end time.
pub trait Interval {
  fn interval_begin(&self) -> DateTime<Utc>;

  /// `None` means the interval has not ended yet.
  fn interval_end(&self) -> Option<DateTime<Utc>>;
}

impl Interval for TimeWindow {
  fn interval_begin(&self) -> DateTime<Utc> { self.begin }

  fn interval_end(&self) -> Option<DateTime<Utc>> { Some(self.end) }
}

impl<T: Interval + ?Sized> Interval for &T {
  fn interval_begin(&self) -> DateTime<Utc> { (**self).interval_begin() }

  fn interval_end(&self) -> Option<DateTime<Utc>> { (**self).interval_end() }
}

/// Result ordering by candidate begin time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
  /// Oldest first, for timelines and full-history listings.
  Ascending,
  /// Most recent first.
  #[default]
  Descending,
}

/// Whether `candidate` overlaps `reference`.
pub fn overlaps<C: Interval + ?Sized>(reference: &TimeWindow, candidate: &C) -> bool {
  if reference.is_inverted() {
    return false;
  }
  let starts_before_end = candidate.interval_begin() <= reference.end;
  let ends_after_begin = candidate
    .interval_end()
    .is_none_or(|end| reference.begin <= end);
  starts_before_end && ends_after_begin
}

/// Whether `inner` lies entirely within `outer`. An open-ended `outer`
/// extends to infinity; an open-ended `inner` only fits an open-ended
/// `outer`.
pub fn contained_in<O, I>(outer: &O, inner: &I) -> bool
where
  O: Interval + ?Sized,
  I: Interval + ?Sized,
{
  if inner.interval_begin() < outer.interval_begin() {
    return false;
  }
  match (outer.interval_end(), inner.interval_end()) {
    (None, _) => true,
    (Some(_), None) => false,
    (Some(outer_end), Some(inner_end)) => inner_end <= outer_end,
  }
}

/// The candidates overlapping `reference`, sorted by begin time in `order`
/// and truncated to `limit` entries when given.
pub fn filter_overlapping<C, I>(
  reference: &TimeWindow,
  candidates: I,
  order: Order,
  limit: Option<usize>,
) -> Vec<C>
where
  C: Interval,
  I: IntoIterator<Item = C>,
{
  if reference.is_inverted() {
    return Vec::new();
  }

  let mut matched: Vec<C> = candidates
    .into_iter()
    .filter(|c| overlaps(reference, c))
    .collect();

  match order {
    Order::Ascending => matched.sort_by_key(|c| c.interval_begin()),
    Order::Descending => matched.sort_by(|a, b| b.interval_begin().cmp(&a.interval_begin())),
  }

  if let Some(limit) = limit {
    matched.truncate(limit);
  }
  matched
}

/// The overlapping candidate with the latest begin time.
pub fn latest_overlapping<C, I>(reference: &TimeWindow, candidates: I) -> Option<C>
where
  C: Interval,
  I: IntoIterator<Item = C>,
{
  filter_overlapping(reference, candidates, Order::Descending, Some(1))
    .into_iter()
    .next()
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Span {
    name:  &'static str,
    begin: DateTime<Utc>,
    end:   Option<DateTime<Utc>>,
  }

  impl Interval for Span {
    fn interval_begin(&self) -> DateTime<Utc> { self.begin }

    fn interval_end(&self) -> Option<DateTime<Utc>> { self.end }
  }

  fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
  }

  fn span(name: &'static str, begin: i64, end: Option<i64>) -> Span {
    Span { name, begin: t(begin), end: end.map(t) }
  }

  fn reference() -> TimeWindow { TimeWindow::new(t(0), t(60)) }

  #[test]
  fn candidate_inside_reference() {
    assert!(overlaps(&reference(), &span("c", 10, Some(20))));
  }

  #[test]
  fn candidate_starts_inside_reference() {
    assert!(overlaps(&reference(), &span("c", 50, Some(90))));
  }

  #[test]
  fn candidate_ends_inside_reference() {
    assert!(overlaps(&reference(), &span("c", -30, Some(10))));
  }

  #[test]
  fn reference_inside_candidate() {
    assert!(overlaps(&reference(), &span("c", -30, Some(90))));
  }

  #[test]
  fn touching_endpoints_overlap() {
    assert!(overlaps(&reference(), &span("c", 60, Some(90))));
    assert!(overlaps(&reference(), &span("c", -30, Some(0))));
  }

  #[test]
  fn disjoint_candidates_are_rejected() {
    assert!(!overlaps(&reference(), &span("left", -30, Some(-1))));
    assert!(!overlaps(&reference(), &span("right", 61, Some(90))));
  }

  #[test]
  fn open_ended_candidate_extends_forever() {
    assert!(overlaps(&reference(), &span("active", -300, None)));
    assert!(overlaps(&reference(), &span("active", 30, None)));
    assert!(!overlaps(&reference(), &span("future", 61, None)));
  }

  #[test]
  fn zero_length_reference_matches_containing_candidates() {
    let instant = TimeWindow::instant(t(10));
    assert!(overlaps(&instant, &span("c", 0, Some(20))));
    assert!(overlaps(&instant, &span("c", 10, Some(10))));
    assert!(!overlaps(&instant, &span("c", 11, Some(20))));
  }

  #[test]
  fn inverted_reference_matches_nothing() {
    let inverted = TimeWindow::new(t(60), t(0));
    assert!(!overlaps(&inverted, &span("c", 10, Some(20))));
    assert!(!overlaps(&inverted, &span("c", -300, None)));
    let matched = filter_overlapping(&inverted, vec![span("c", 10, Some(20))], Order::Ascending, None);
    assert!(matched.is_empty());
  }

  #[test]
  fn filter_orders_descending_by_default() {
    let candidates = vec![
      span("a", 0, Some(5)),
      span("b", 40, Some(45)),
      span("out", 100, Some(110)),
      span("c", 20, Some(25)),
    ];
    let matched = filter_overlapping(&reference(), candidates, Order::default(), None);
    let names: Vec<_> = matched.iter().map(|s| s.name).collect();
    assert_eq!(names, ["b", "c", "a"]);
  }

  #[test]
  fn filter_orders_ascending_on_request() {
    let candidates = vec![span("b", 40, Some(45)), span("a", 0, Some(5))];
    let matched = filter_overlapping(&reference(), candidates, Order::Ascending, None);
    let names: Vec<_> = matched.iter().map(|s| s.name).collect();
    assert_eq!(names, ["a", "b"]);
  }

  #[test]
  fn latest_takes_most_recent_begin() {
    let candidates = vec![span("a", 0, Some(5)), span("b", 40, None), span("c", 20, Some(25))];
    assert_eq!(latest_overlapping(&reference(), candidates).map(|s| s.name), Some("b"));
  }

  #[test]
  fn containment_respects_open_ends() {
    let open = span("outer", 0, None);
    let closed = span("outer", 0, Some(60));
    assert!(contained_in(&open, &span("inner", 10, Some(1000))));
    assert!(contained_in(&closed, &span("inner", 0, Some(60))));
    assert!(!contained_in(&closed, &span("inner", 10, Some(61))));
    assert!(!contained_in(&closed, &span("inner", -1, Some(10))));
    assert!(!contained_in(&closed, &span("inner", 10, None)));
  }
}
