//! Message inbox endpoints.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use greenroom_core::{
  media::MediaStore, message::Message, store::CurationStore,
};
use greenroom_curation::mailer::Mailer;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `GET /api/messages` — the caller's inbox, newest first.
pub async fn list<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  user: CurrentUser,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let inbox = state
    .store
    .list_messages(user.profile.profile_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(inbox))
}

/// `POST /api/messages/{id}/read` — only the recipient can mark a message.
pub async fn mark_read<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let marked = state
    .store
    .mark_read(id, user.profile.profile_id)
    .await
    .map_err(ApiError::store)?;

  if !marked {
    return Err(ApiError::NotFound(format!("message {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
