//! Admin back-office: the review queue and the decision endpoint.

use axum::{
  Json,
  extract::{Path, State},
};
use greenroom_core::{
  media::MediaStore,
  profile::{OnboardingStatus, Profile},
  store::{CurationStore, ProfileQuery},
};
use greenroom_curation::{
  decide::{Decision, DecisionOutcome},
  mailer::Mailer,
  reconcile::ReconcileReport,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::AdminUser, error::ApiError};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PendingApplication {
  pub profile:    Profile,
  pub song_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DecideBody {
  pub decision: Decision,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /api/curation/pending`
pub async fn pending<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  _admin: AdminUser,
) -> Result<Json<Vec<PendingApplication>>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let profiles = state
    .store
    .list_profiles(&ProfileQuery {
      status: Some(OnboardingStatus::Submitted),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  let mut applications = Vec::with_capacity(profiles.len());
  for profile in profiles {
    let song_count = state
      .store
      .count_songs(profile.profile_id)
      .await
      .map_err(ApiError::store)?;
    applications.push(PendingApplication { profile, song_count });
  }

  Ok(Json(applications))
}

/// `POST /api/curation/{id}/decide` — body: `{"decision": "approve"|"reject"}`
pub async fn decide<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  admin: AdminUser,
  Path(id): Path<Uuid>,
  Json(body): Json<DecideBody>,
) -> Result<Json<DecisionOutcome>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let outcome = state
    .service
    .decide(admin.profile.profile_id, id, body.decision)
    .await?;
  Ok(Json(outcome))
}

/// `POST /api/curation/reconcile`
pub async fn reconcile<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  _admin: AdminUser,
) -> Result<Json<ReconcileReport>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let report = state.service.reconcile().await?;
  Ok(Json(report))
}
