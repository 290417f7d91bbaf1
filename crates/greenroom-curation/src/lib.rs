//! The greenroom curation workflow engine.
//!
//! Owns the onboarding state machine (`pending → submitted`), the admin
//! decision processor (`submitted → approved | rejected`), and the
//! notification fan-out around them. Every multi-step operation runs as a
//! saga over independent store/media/mail calls: state transitions are
//! conditional, artifact writes precede row writes, and interrupted runs are
//! repaired by [the reconciliation pass](CurationService::reconcile).

pub mod decide;
pub mod error;
pub mod mailer;
pub mod media;
pub mod notify;
pub mod reconcile;
pub mod submit;
pub mod template;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use greenroom_core::{media::MediaStore, store::CurationStore};

use mailer::Mailer;

pub use error::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for the curation workflow.
#[derive(Debug, Clone)]
pub struct CurationConfig {
  /// Base URL for public creator pages, e.g. `https://shop.example.com`.
  pub public_base_url: String,
  /// Per-song upload ceiling in bytes.
  pub max_probe_bytes: usize,
}

impl Default for CurationConfig {
  fn default() -> Self {
    Self {
      public_base_url: "http://localhost:8080".to_owned(),
      max_probe_bytes: 25 * 1024 * 1024,
    }
  }
}

impl CurationConfig {
  /// The public page URL for a slug. Stable once issued; it appears in
  /// approval mails and deep links.
  pub fn creator_url(&self, slug: &str) -> String {
    format!("{}/creator/{slug}", self.public_base_url.trim_end_matches('/'))
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The curation workflow bound to its collaborators.
///
/// Generic over the store, media, and mail seams so tests can run the whole
/// workflow against in-memory fakes.
pub struct CurationService<S, M, E> {
  store:  Arc<S>,
  media:  Arc<M>,
  mailer: Arc<E>,
  config: CurationConfig,
}

impl<S, M, E> CurationService<S, M, E>
where
  S: CurationStore,
  M: MediaStore,
  E: Mailer,
{
  pub fn new(
    store: Arc<S>,
    media: Arc<M>,
    mailer: Arc<E>,
    config: CurationConfig,
  ) -> Self {
    Self { store, media, mailer, config }
  }

  pub fn config(&self) -> &CurationConfig { &self.config }

  pub(crate) fn store(&self) -> &S { &self.store }

  pub(crate) fn media(&self) -> &M { &self.media }

  pub(crate) fn mailer(&self) -> &E { &self.mailer }
}
