//! Footstep indicators, scalar mobility metrics derived from a time-ordered
//! sequence of footsteps.
//!
//! Every calculator is a pure function: the input is only read, the result
//! only depends on the input, and no calculator looks at the wall clock. Any
//! notion of "now" reaches them through an explicit window.
//!
//! Degenerate input never produces an error, `NaN` or infinity. Too few
//! footsteps or a non-positive elapsed time yield `0`.

use serde::{Deserialize, Serialize};

use crate::{
  footstep::{Footstep, Position, positions},
  time::TimeWindow,
};

// ─── Indicator ───────────────────────────────────────────────────────────────

/// The name of an indicator. Its string form doubles as the serialised tag.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
pub enum IndicatorName {
  CoveredDistance,
  FirstToLastStepDistance,
  AverageSpeed,
  AverageStrideLength,
  AverageStrideFrequency,
  WalkingTime,
  FallRiskScore,
}

impl IndicatorName {
  pub fn unit(self) -> &'static str {
    match self {
      Self::CoveredDistance | Self::FirstToLastStepDistance | Self::AverageStrideLength => "mm",
      Self::AverageSpeed => "mm/s",
      Self::AverageStrideFrequency => "steps/second",
      Self::WalkingTime => "s",
      Self::FallRiskScore => "SF-VRP",
    }
  }
}

/// A named value with its unit. Created fresh for every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
  pub name:  IndicatorName,
  pub value: f64,
  pub unit:  String,
}

impl Indicator {
  /// Non-finite values are stored as `0`.
  pub fn new(name: IndicatorName, value: f64) -> Self {
    Self {
      name,
      value: finite_or_zero(value),
      unit: name.unit().to_owned(),
    }
  }
}

fn finite_or_zero(value: f64) -> f64 { if value.is_finite() { value } else { 0.0 } }

/// `numerator / elapsed`, or `0` when `elapsed` is not positive.
fn per_second(numerator: f64, elapsed: f64) -> f64 {
  if elapsed > 0.0 { finite_or_zero(numerator / elapsed) } else { 0.0 }
}

// ─── Raw computations ────────────────────────────────────────────────────────

fn path_length(points: &[Position]) -> f64 {
  points.windows(2).map(|pair| pair[0].distance_to(&pair[1])).sum()
}

/// Seconds between the first and last footstep, `0` for fewer than two.
fn span_secs(footsteps: &[&Footstep]) -> f64 {
  match (footsteps.first(), footsteps.last()) {
    (Some(first), Some(last)) => TimeWindow::new(first.time, last.time).duration_secs(),
    _ => 0.0,
  }
}

/// The elapsed time a rate is computed over: the window duration when the
/// caller supplies one, otherwise the span of `footsteps`.
fn elapsed_secs(footsteps: &[&Footstep], window: Option<&TimeWindow>) -> f64 {
  window.map_or_else(|| span_secs(footsteps), TimeWindow::duration_secs)
}

fn positioned(footsteps: &[Footstep]) -> Vec<&Footstep> {
  footsteps.iter().filter(|f| f.has_position()).collect()
}

fn all(footsteps: &[Footstep]) -> Vec<&Footstep> { footsteps.iter().collect() }

// ─── Calculators ─────────────────────────────────────────────────────────────

/// Cumulative distance walked: the sum of Euclidean distances between
/// consecutive positioned footsteps.
pub fn covered_distance(footsteps: &[Footstep]) -> Indicator {
  Indicator::new(IndicatorName::CoveredDistance, path_length(&positions(footsteps)))
}

/// Straight-line distance from the first to the last positioned footstep.
pub fn first_to_last_step_distance(footsteps: &[Footstep]) -> Indicator {
  let points = positions(footsteps);
  let value = match (points.first(), points.last()) {
    (Some(first), Some(last)) if points.len() >= 2 => first.distance_to(last),
    _ => 0.0,
  };
  Indicator::new(IndicatorName::FirstToLastStepDistance, value)
}

/// The time the footsteps were walked over, in seconds: the window duration
/// when given, otherwise the first-to-last footstep span.
pub fn walking_time(footsteps: &[Footstep], window: Option<&TimeWindow>) -> Indicator {
  let elapsed = elapsed_secs(&all(footsteps), window).max(0.0);
  Indicator::new(IndicatorName::WalkingTime, elapsed)
}

/// Covered distance divided by elapsed time. Without a window the elapsed
/// time is the span between the first and last positioned footstep.
pub fn average_speed(footsteps: &[Footstep], window: Option<&TimeWindow>) -> Indicator {
  let used = positioned(footsteps);
  let distance = path_length(&positions(footsteps));
  Indicator::new(IndicatorName::AverageSpeed, per_second(distance, elapsed_secs(&used, window)))
}

/// Covered distance divided by the number of strides between positioned
/// footsteps.
pub fn average_stride_length(footsteps: &[Footstep]) -> Indicator {
  let points = positions(footsteps);
  let value = if points.len() >= 2 {
    path_length(&points) / (points.len() - 1) as f64
  } else {
    0.0
  };
  Indicator::new(IndicatorName::AverageStrideLength, value)
}

/// Number of footsteps, positioned or not, per second of elapsed time.
///
/// When the footsteps come from a single wearable this is the stride
/// frequency of the person wearing it.
pub fn average_stride_frequency(footsteps: &[Footstep], window: Option<&TimeWindow>) -> Indicator {
  let count = footsteps.len() as f64;
  let elapsed = elapsed_secs(&all(footsteps), window);
  Indicator::new(IndicatorName::AverageStrideFrequency, per_second(count, elapsed))
}

/// All footstep indicators for one sequence, in a fixed order.
pub fn footstep_indicators(footsteps: &[Footstep], window: Option<&TimeWindow>) -> Vec<Indicator> {
  vec![
    covered_distance(footsteps),
    first_to_last_step_distance(footsteps),
    walking_time(footsteps, window),
    average_speed(footsteps, window),
    average_stride_length(footsteps),
    average_stride_frequency(footsteps, window),
  ]
}
