//! Application composition for the QR Card server.
//!
//! Wires the [`qrcard_api`] router to a store and wraps it in the
//! cross-cutting layers: request tracing, CORS and a body size cap.

pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue};
use qrcard_api::{AppState, DEFAULT_CONSENT_VERSION, api_router};
use qrcard_core::store::{DEFAULT_SLUG_ATTEMPTS, ProfileStore};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QRCARD_*` environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// `*` allows any origin; anything else is matched exactly.
  pub cors_origin:     String,
  pub consent_version: String,
  pub slug_attempts:   u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            3000,
      store_path:      PathBuf::from("qr_cards.sqlite"),
      cors_origin:     "*".to_string(),
      consent_version: DEFAULT_CONSENT_VERSION.to_string(),
      slug_attempts:   DEFAULT_SLUG_ATTEMPTS,
    }
  }
}

// ─── Layers ───────────────────────────────────────────────────────────────────

/// CORS policy for `origin`.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, Error> {
  let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
  if origin == "*" {
    return Ok(layer.allow_origin(Any));
  }
  let value =
    HeaderValue::from_str(origin).map_err(|source| Error::InvalidCorsOrigin {
      origin: origin.to_owned(),
      source,
    })?;
  Ok(layer.allow_origin(value))
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router, Error>
where
  S: ProfileStore + 'static,
{
  let state = AppState::new(store, config.consent_version.as_str());
  Ok(
    api_router(state)
      .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
      .layer(cors_layer(&config.cors_origin)?)
      .layer(TraceLayer::new_for_http()),
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
