//! Error type for `greenroom-curation`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Validation, authorization, and state-machine errors.
  #[error(transparent)]
  Domain(#[from] greenroom_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("media storage error: {0}")]
  Media(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn media<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Media(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
