//! Account registration.
//!
//! Registration creates the profile row every identity carries (initial
//! state `pending`/`pending`, role `user`) plus its login credential. The
//! login is an email address — it is where decision mail will go.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use greenroom_core::{
  credential::NewCredential,
  media::MediaStore,
  profile::{NewProfile, Role},
  store::CurationStore,
};
use greenroom_curation::mailer::Mailer;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub display_name: String,
  /// Email address; doubles as the login.
  pub login:        String,
  pub password:     String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
  pub profile_id: Uuid,
}

/// `POST /api/register`
pub async fn register<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let login = body.login.trim().to_lowercase();
  if login.is_empty() || !login.contains('@') {
    return Err(ApiError::BadRequest("a valid email address is required".into()));
  }
  if body.password.len() < 8 {
    return Err(ApiError::BadRequest(
      "password must be at least 8 characters".into(),
    ));
  }

  if state
    .store
    .get_credential(&login)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("login {login} is taken")));
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(body.password.as_bytes(), &salt)
    .map_err(|e| ApiError::BadRequest(format!("unusable password: {e}")))?
    .to_string();

  let profile = state
    .store
    .create_profile(NewProfile {
      display_name: body.display_name,
      role:         Role::User,
    })
    .await
    .map_err(ApiError::store)?;

  state
    .store
    .add_credential(NewCredential {
      login,
      profile_id: profile.profile_id,
      password_hash,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(RegisterResponse { profile_id: profile.profile_id }),
  ))
}
