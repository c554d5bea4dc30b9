//! Strong ETags for generated vCard bodies.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};

/// Quoted hex SHA-256 of `body`. The builder is deterministic, so an
/// unchanged contact always yields the same tag.
pub fn compute_etag(body: &str) -> String {
  let hash = Sha256::digest(body.as_bytes());
  format!("\"{}\"", hex::encode(hash))
}

/// `true` if `If-None-Match` lists `etag` (or is `*`).
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(str::trim)
    .any(|candidate| candidate == "*" || candidate == etag)
}
