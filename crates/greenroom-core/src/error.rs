//! Error types for `greenroom-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::profile::OnboardingStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("profile {id} is not awaiting review (status: {status})")]
  NotAwaitingReview { id: Uuid, status: OnboardingStatus },

  #[error("profile {0} was modified by a concurrent transition")]
  StaleTransition(Uuid),

  #[error("operation requires the admin role")]
  AdminRequired,

  #[error("artist name is required")]
  NameMissing,

  #[error("all legal confirmations must be accepted")]
  LegalConsentMissing,

  #[error("a submission needs 1 or 2 probe songs, got {0}")]
  ProbeCount(usize),

  #[error("probe song {title:?} is {size} bytes, over the {limit} byte limit")]
  ProbeTooLarge {
    title: String,
    size:  usize,
    limit: usize,
  },

  #[error("submitted text contains a blocked word: {0:?}")]
  BlockedContent(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
