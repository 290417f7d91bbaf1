//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The domain error taxonomy maps onto HTTP statuses here, in one place:
//! validation → 422, authorization → 401/403, stale or re-run transitions →
//! 409, unknown entities → 404, everything infrastructural → 500.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use greenroom_core::Error as DomainError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthorized,

  #[error("admin role required")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation failed: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<DomainError> for ApiError {
  fn from(e: DomainError) -> Self {
    match e {
      DomainError::ProfileNotFound(id) => {
        Self::NotFound(format!("profile {id} not found"))
      }
      DomainError::AdminRequired => Self::Forbidden,
      e @ (DomainError::NotAwaitingReview { .. }
      | DomainError::StaleTransition(_)) => Self::Conflict(e.to_string()),
      e @ (DomainError::NameMissing
      | DomainError::LegalConsentMissing
      | DomainError::ProbeCount(_)
      | DomainError::ProbeTooLarge { .. }
      | DomainError::BlockedContent(_)) => Self::Unprocessable(e.to_string()),
      e @ DomainError::Serialization(_) => Self::Store(Box::new(e)),
    }
  }
}

impl From<greenroom_curation::Error> for ApiError {
  fn from(e: greenroom_curation::Error) -> Self {
    match e {
      greenroom_curation::Error::Domain(domain) => domain.into(),
      greenroom_curation::Error::Store(inner) => Self::Store(inner),
      greenroom_curation::Error::Media(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let unauthorized = matches!(self, ApiError::Unauthorized);
    let mut response =
      (status, Json(json!({ "error": self.to_string() }))).into_response();
    if unauthorized {
      response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        header::HeaderValue::from_static("Basic realm=\"greenroom\""),
      );
    }
    response
  }
}
