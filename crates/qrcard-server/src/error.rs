//! Errors raised while composing the application.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid CORS origin {origin:?}: {source}")]
  InvalidCorsOrigin {
    origin: String,
    #[source]
    source: axum::http::header::InvalidHeaderValue,
  },
}
