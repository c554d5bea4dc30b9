//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use qrcard_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Required contact fields were missing; the body lists them.
  #[error("missing required fields: {}", .missing.join(", "))]
  Validation { missing: Vec<&'static str> },

  /// A transient condition; the same request may succeed later.
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("qr error: {0}")]
  Qr(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error, surfacing domain failures with their own status.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    let domain = match e.as_domain() {
      Some(qrcard_core::Error::Validation { missing }) => {
        Some(Self::Validation {
          missing: missing.clone(),
        })
      }
      Some(err @ qrcard_core::Error::SlugExhausted { .. }) => {
        Some(Self::Unavailable(err.to_string()))
      }
      Some(err @ qrcard_core::Error::MalformedUrl(_)) => {
        Some(Self::BadRequest(err.to_string()))
      }
      None => None,
    };
    domain.unwrap_or_else(|| Self::Store(Box::new(e)))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation { missing } => {
        let body = json!({ "error": self.to_string(), "missing": missing });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
      }
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Qr(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
