//! JSON REST API for greenroom.
//!
//! Exposes an axum [`Router`] backed by any
//! [`greenroom_core::store::CurationStore`], a media store, and a mail
//! transport. TLS and reverse-proxy concerns are the deployment's
//! responsibility.

pub mod auth;
pub mod error;
pub mod handlers;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use greenroom_core::{media::MediaStore, store::CurationStore};
use greenroom_curation::{CurationService, mailer::Mailer};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// Base URL of the public storefront, used in mails and deep links.
  pub public_base_url: String,
  pub store_path:      PathBuf,
  pub media_dir:       PathBuf,
  /// Base URL the media directory is served from.
  pub media_base_url:  String,
  #[serde(default = "default_max_probe_bytes")]
  pub max_probe_bytes: usize,
  /// Email provider settings; mail is disabled when absent.
  #[serde(default)]
  pub mail:            Option<MailSettings>,
}

fn default_max_probe_bytes() -> usize { 25 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
  pub endpoint:     String,
  pub api_key:      String,
  pub sender:       String,
  #[serde(default = "default_mail_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_mail_timeout_secs() -> u64 { 5 }

impl MailSettings {
  pub fn into_mailer_config(self) -> greenroom_curation::mailer::MailerConfig {
    greenroom_curation::mailer::MailerConfig {
      endpoint:     self.endpoint,
      api_key:      self.api_key,
      sender:       self.sender,
      timeout_secs: self.timeout_secs,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M, E> {
  pub store:   Arc<S>,
  pub service: Arc<CurationService<S, M, E>>,
}

impl<S, M, E> Clone for AppState<S, M, E> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      service: self.service.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S, M, E>(state: AppState<S, M, E>) -> Router
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  Router::new()
    // Accounts
    .route("/api/register", post(handlers::accounts::register::<S, M, E>))
    // Public storefront
    .route("/api/creators", get(handlers::storefront::list::<S, M, E>))
    .route(
      "/api/creators/{slug}",
      get(handlers::storefront::get_one::<S, M, E>),
    )
    // Onboarding
    .route("/api/onboarding", post(handlers::onboarding::submit::<S, M, E>))
    // Admin curation
    .route(
      "/api/curation/pending",
      get(handlers::curation::pending::<S, M, E>),
    )
    .route(
      "/api/curation/{id}/decide",
      post(handlers::curation::decide::<S, M, E>),
    )
    .route(
      "/api/curation/reconcile",
      post(handlers::curation::reconcile::<S, M, E>),
    )
    // Messages
    .route("/api/messages", get(handlers::messages::list::<S, M, E>))
    .route(
      "/api/messages/{id}/read",
      post(handlers::messages::mark_read::<S, M, E>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
