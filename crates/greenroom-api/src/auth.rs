//! HTTP Basic-auth extractors — the single authorization guard every
//! state-changing endpoint goes through.
//!
//! Credentials resolve against the `credentials` table; the role claim comes
//! from the resolved profile row. Handlers declare the access level they
//! need by taking [`CurrentUser`] or [`AdminUser`] as an argument — there is
//! no ad-hoc role checking inside handlers.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use greenroom_core::{
  media::MediaStore,
  profile::{Profile, Role},
  store::CurationStore,
};
use greenroom_curation::mailer::Mailer;

use crate::{AppState, error::ApiError};

/// An authenticated caller.
pub struct CurrentUser {
  pub profile: Profile,
}

/// An authenticated caller holding the admin role.
pub struct AdminUser {
  pub profile: Profile,
}

fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (login, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((login.to_owned(), password.to_owned()))
}

/// Resolve Basic credentials to a profile, verifying the argon2 hash.
pub async fn authenticate<S, M, E>(
  headers: &HeaderMap,
  state: &AppState<S, M, E>,
) -> Result<Profile, ApiError>
where
  S: CurationStore,
  M: MediaStore,
  E: Mailer,
{
  let (login, password) = basic_credentials(headers)?;

  let credential = state
    .store
    .get_credential(&login)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&credential.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  state
    .store
    .get_profile(credential.profile_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)
}

impl<S, M, E> FromRequestParts<AppState<S, M, E>> for CurrentUser
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M, E>,
  ) -> Result<Self, Self::Rejection> {
    let profile = authenticate(&parts.headers, state).await?;
    Ok(CurrentUser { profile })
  }
}

impl<S, M, E> FromRequestParts<AppState<S, M, E>> for AdminUser
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M, E>,
  ) -> Result<Self, Self::Rejection> {
    let profile = authenticate(&parts.headers, state).await?;
    if profile.role != Role::Admin {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminUser { profile })
  }
}
