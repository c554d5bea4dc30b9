//! Field normalizer: best-effort cleanup of raw form strings before they are
//! persisted or written into a vCard.

use url::Url;

use crate::{Error, Result};

// ─── Phone ───────────────────────────────────────────────────────────────────

/// Reformat a phone number into an E.164-like string.
///
/// Non-digits are stripped, then:
/// - exactly 10 digits get a `+1` prefix (North American default);
/// - a leading `00` international prefix becomes `+`;
/// - anything else (11 digits starting with `1`, or input that already
///   carried a `+`) becomes `+` followed by the digits.
///
/// This is a heuristic, not validation: ambiguous international numbers are
/// passed through as-is. Input with no digits yields an empty string.
pub fn normalize_phone(raw: &str) -> String {
  let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
  if digits.is_empty() {
    return String::new();
  }
  if digits.len() == 10 {
    return format!("+1{digits}");
  }
  if let Some(rest) = digits.strip_prefix("00") {
    return format!("+{rest}");
  }
  format!("+{digits}")
}

// ─── URL ─────────────────────────────────────────────────────────────────────

/// Parse `raw` as an absolute URL and return its normalized serialization.
pub fn try_sanitize_url(raw: &str) -> Result<String> {
  Url::parse(raw.trim())
    .map(String::from)
    .map_err(|e| Error::MalformedUrl(format!("{raw:?}: {e}")))
}

/// Like [`try_sanitize_url`], but a malformed URL downgrades to an empty
/// string instead of failing.
pub fn sanitize_url(raw: &str) -> String {
  if raw.trim().is_empty() {
    return String::new();
  }
  try_sanitize_url(raw).unwrap_or_else(|e| {
    tracing::debug!(error = %e, "dropping unparseable url");
    String::new()
  })
}

// ─── vCard text ──────────────────────────────────────────────────────────────

/// Escape a vCard text value: `\`, newline, `,`, `;`.
///
/// Backslash goes first so the backslashes introduced by later substitutions
/// are not doubled.
pub fn escape_vcard_text(raw: &str) -> String {
  raw
    .replace('\\', "\\\\")
    .replace('\n', "\\n")
    .replace(',', "\\,")
    .replace(';', "\\;")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
