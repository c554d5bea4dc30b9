//! Persisted records and read models: profiles, consent records, and the
//! views returned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::Contact;

/// Store-assigned contact identifier.
pub type ContactId = i64;

// ─── Contacts ────────────────────────────────────────────────────────────────

/// A contact as it was persisted, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContact {
  pub id:         ContactId,
  #[serde(flatten)]
  pub contact:    Contact,
  pub created_at: DateTime<Utc>,
}

/// One row of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
  pub id:         ContactId,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub mobile:     String,
  pub website:    String,
  pub created_at: DateTime<Utc>,
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// A public profile: a unique slug pointing at one contact.
///
/// The slug never changes once issued; `view_count` only increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub slug:       String,
  pub contact_id: ContactId,
  pub is_public:  bool,
  pub view_count: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Profile {
  /// Relative URL of the public profile page.
  pub fn path(&self) -> String { profile_path(&self.slug) }
}

/// The joined read model returned by a public profile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
  pub slug:       String,
  /// View count including the fetch that produced this value.
  pub view_count: u64,
  pub contact:    StoredContact,
}

/// Relative URL of the public profile page for `slug`.
pub fn profile_path(slug: &str) -> String { format!("/c/{slug}") }

// ─── Consent ─────────────────────────────────────────────────────────────────

/// Input to consent recording. Request context (IP, user agent) is passed in
/// explicitly by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewConsent {
  pub text:       String,
  pub version:    String,
  pub ip_address: String,
  pub user_agent: String,
}

/// An immutable audit entry recording what the submitter agreed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
  pub id:          i64,
  pub contact_id:  ContactId,
  pub text:        String,
  pub version:     String,
  pub ip_address:  String,
  pub user_agent:  String,
  pub recorded_at: DateTime<Utc>,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// Result of an atomic contact + profile + consent submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub contact_id: ContactId,
  pub slug:       String,
}

impl Submission {
  pub fn profile_path(&self) -> String { profile_path(&self.slug) }
}
