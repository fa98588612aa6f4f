//! Error types for `stride-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile span begins at {begin} but ends earlier at {end}")]
  InvalidProfileSpan {
    begin: DateTime<Utc>,
    end:   DateTime<Utc>,
  },

  #[error("unknown time zone: {0:?}")]
  UnknownTimeZone(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
