//! Error types for `qrcard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required contact fields were missing or blank. Names are the
  /// JSON field names, in declaration order.
  #[error("missing required fields: {}", .missing.join(", "))]
  Validation { missing: Vec<&'static str> },

  #[error("could not issue a unique slug after {attempts} attempts")]
  SlugExhausted { attempts: u32 },

  #[error("malformed url: {0}")]
  MalformedUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
