//! Candidate submission endpoint.
//!
//! Audio and avatar payloads arrive base64-encoded in the JSON body and are
//! decoded here; the workflow engine sees plain bytes. Social links are
//! accepted as loosely-typed JSON and normalised through the one defensive
//! parser in `greenroom-core`.

use axum::{Json, extract::State};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use greenroom_core::{
  media::MediaStore, profile::SocialLinks, store::CurationStore,
};
use greenroom_curation::{
  mailer::Mailer,
  submit::{MediaUpload, ProbeUpload, SubmissionOutcome, SubmitRequest},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub artist_name:      String,
  #[serde(default)]
  pub bio:              Option<String>,
  #[serde(default)]
  pub tech_stack:       Vec<String>,
  /// Object with fixed keys, or a legacy bare URL string.
  #[serde(default)]
  pub social_links:     serde_json::Value,
  pub accepted_terms:   bool,
  pub confirmed_rights: bool,
  pub probe_songs:      Vec<ProbeBody>,
  #[serde(default)]
  pub avatar:           Option<UploadBody>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeBody {
  pub title:       String,
  #[serde(default)]
  pub genres:      Vec<String>,
  #[serde(default)]
  pub price_cents: i64,
  pub media_type:  String,
  /// Base64-encoded audio payload.
  pub data:        String,
}

#[derive(Debug, Deserialize)]
pub struct UploadBody {
  pub media_type: String,
  /// Base64-encoded image payload.
  pub data:       String,
}

fn decode_payload(data: &str) -> Result<Bytes, ApiError> {
  B64
    .decode(data)
    .map(Bytes::from)
    .map_err(|_| ApiError::BadRequest("payload is not valid base64".into()))
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /api/onboarding`
pub async fn submit<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  user: CurrentUser,
  Json(body): Json<SubmitBody>,
) -> Result<Json<SubmissionOutcome>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let probes = body
    .probe_songs
    .iter()
    .map(|probe| {
      Ok(ProbeUpload {
        title:       probe.title.clone(),
        genres:      probe.genres.clone(),
        price_cents: probe.price_cents,
        media_type:  probe.media_type.clone(),
        bytes:       decode_payload(&probe.data)?,
      })
    })
    .collect::<Result<Vec<_>, ApiError>>()?;

  let avatar = body
    .avatar
    .as_ref()
    .map(|upload| {
      Ok::<_, ApiError>(MediaUpload {
        media_type: upload.media_type.clone(),
        bytes:      decode_payload(&upload.data)?,
      })
    })
    .transpose()?;

  let request = SubmitRequest {
    artist_name: body.artist_name,
    bio: body.bio,
    tech_stack: body.tech_stack,
    social_links: SocialLinks::from_json(body.social_links),
    accepted_terms: body.accepted_terms,
    confirmed_rights: body.confirmed_rights,
    probes,
    avatar,
  };

  let outcome = state
    .service
    .submit(user.profile.profile_id, request)
    .await?;
  Ok(Json(outcome))
}
