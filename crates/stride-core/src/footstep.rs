//! Footsteps: the raw positional events produced by wearables.
//!
//! Footsteps are immutable once recorded. Only the ingestion pipeline writes
//! them; this crate only reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An `(x, y)` location on a floor, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self { Self { x, y } }

  /// Euclidean distance to `other`.
  pub fn distance_to(&self, other: &Position) -> f64 {
    let dx = self.x - other.x;
    let dy = self.y - other.y;
    (dx * dx + dy * dy).sqrt()
  }
}

/// A single step registered by a wearable. The position is absent when the
/// floor could not localise the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footstep {
  pub wearable_id: String,
  pub floor_id:    Option<Uuid>,
  pub time:        DateTime<Utc>,
  pub position:    Option<Position>,
}

impl Footstep {
  pub fn has_position(&self) -> bool { self.position.is_some() }
}

/// The positions of all positioned footsteps, in input order.
pub fn positions(footsteps: &[Footstep]) -> Vec<Position> {
  footsteps.iter().filter_map(|f| f.position).collect()
}
