//! Error type for `qrcard-store-sqlite`.

use qrcard_core::{profile::ContactId, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] qrcard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),
}

impl StoreError for Error {
  fn as_domain(&self) -> Option<&qrcard_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
