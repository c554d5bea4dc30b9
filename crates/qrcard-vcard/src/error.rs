//! Error types for the qrcard-vcard reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("vCard missing BEGIN/END:VCARD envelope")]
  MissingEnvelope,

  #[error("malformed content-line: {0}")]
  MalformedContentLine(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
