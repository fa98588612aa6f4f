//! Error type for `stride-analysis`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stride_core::Error),

  /// The [`GaitSource`](stride_core::source::GaitSource) failed.
  #[error("source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid configuration: {0}")]
  Config(String),
}

impl Error {
  pub(crate) fn from_source<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Source(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
