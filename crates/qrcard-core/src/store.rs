//! The `ProfileStore` trait.
//!
//! Implemented by storage backends (e.g. `qrcard-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend. A store is
//! an explicit value handed to each caller; its connection lifecycle belongs
//! to the composing application.

use std::future::Future;

use crate::{
  contact::Contact,
  profile::{
    ConsentRecord, ContactId, ContactSummary, NewConsent, Profile,
    PublicProfile, StoredContact, Submission,
  },
};

/// Default page size for [`ProfileStore::list_contacts`].
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Default number of slugs tried before giving up with
/// [`Error::SlugExhausted`](crate::Error::SlugExhausted).
pub const DEFAULT_SLUG_ATTEMPTS: u32 = 5;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A backend error that can expose the domain failure behind it, so callers
/// can tell a rejected input from a broken database.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error this wraps, if it is not a backend fault.
  fn as_domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a QR Card persistence backend.
///
/// Contacts and consent records are append-only. A profile's only mutable
/// state is its view counter, which only increases.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded runtimes (e.g. tokio with `axum`).
pub trait ProfileStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate, normalize and persist a contact; returns its new id.
  ///
  /// Fails with [`Error::Validation`](crate::Error::Validation) and writes
  /// nothing if a required field is missing.
  fn create_contact(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<ContactId, Self::Error>> + Send + '_;

  /// Issue a public profile with a fresh unique slug for an existing contact.
  fn issue_profile(
    &self,
    contact_id: ContactId,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Append an immutable consent record for an existing contact.
  fn record_consent(
    &self,
    contact_id: ContactId,
    consent: NewConsent,
  ) -> impl Future<Output = Result<ConsentRecord, Self::Error>> + Send + '_;

  /// Persist a contact, issue its profile and record consent as one atomic
  /// unit. On any failure none of the three rows remain.
  fn submit(
    &self,
    contact: Contact,
    consent: NewConsent,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch a public profile by slug and count the view. Returns `None`, and
  /// counts nothing, for unknown or private slugs.
  fn get_public_profile<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<PublicProfile>, Self::Error>> + Send + 'a;

  /// Read a profile without counting a view.
  fn get_profile<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<StoredContact>, Self::Error>> + Send + '_;

  /// Render a stored contact as vCard text. Regenerated on every call.
  fn get_contact_vcard(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Consent records for a contact, oldest first.
  fn list_consents(
    &self,
    contact_id: ContactId,
  ) -> impl Future<Output = Result<Vec<ConsentRecord>, Self::Error>> + Send + '_;

  /// Most recently created contacts first.
  fn list_contacts(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ContactSummary>, Self::Error>> + Send + '_;
}
