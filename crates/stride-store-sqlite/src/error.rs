//! Error type for `stride-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stride_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column holds an unknown value.
  #[error("cannot decode column value: {0}")]
  Decode(String),

  #[error("fall risk profile not found: {0}")]
  ProfileNotFound(uuid::Uuid),

  #[error("fall risk profile {0} is already removed")]
  AlreadyRemoved(uuid::Uuid),

  #[error("wearable assignment not found: {0}")]
  AssignmentNotFound(uuid::Uuid),

  #[error("wearable assignment {0} is already closed")]
  AssignmentClosed(uuid::Uuid),

  #[error("assignment cannot end before it begins")]
  InvalidAssignmentEnd,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
