//! JSON REST API for QR Card.
//!
//! Exposes an axum [`Router`] backed by any [`ProfileStore`]. TLS, CORS and
//! transport concerns are the caller's responsibility. Consent records take
//! the client IP from [`axum::extract::ConnectInfo`], so serve the router with
//! `into_make_service_with_connect_info::<SocketAddr>()`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = qrcard_api::api_router(AppState::new(store, "v1"));
//! ```

pub mod cards;
pub mod client;
pub mod contacts;
pub mod error;
pub mod etag;
pub mod preview;
pub mod qr;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use qrcard_core::store::ProfileStore;

pub use error::ApiError;

/// Consent version recorded when none is configured.
pub const DEFAULT_CONSENT_VERSION: &str = "v1";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:           Arc<S>,
  /// Version tag stored with every consent record.
  pub consent_version: Arc<str>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, consent_version: impl Into<Arc<str>>) -> Self {
    Self {
      store,
      consent_version: consent_version.into(),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:           Arc::clone(&self.store),
      consent_version: Arc::clone(&self.consent_version),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the fully-materialised API router.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ProfileStore + 'static,
{
  Router::new()
    // Cards
    .route("/api/qr-cards", post(cards::create::<S>))
    .route("/c/{slug}", get(cards::public_profile::<S>))
    // Contacts
    .route("/api/contacts/{id_vcf}", get(contacts::vcard::<S>))
    .route("/api/admin/contacts", get(contacts::list::<S>))
    // Previews
    .route("/api/vcard", post(preview::vcard))
    .route("/api/qr", post(preview::qr))
    .with_state(state)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
