//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  collections::{HashSet, VecDeque},
  sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
  },
};

use qrcard_core::{
  contact::{Address, Contact},
  profile::NewConsent,
  slug::{RandomSlugs, SlugSource, is_valid_slug},
  store::{DEFAULT_SLUG_ATTEMPTS, ProfileStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ada() -> Contact {
  Contact {
    first_name: "Ada".into(),
    last_name: "Lovelace".into(),
    email: "ada@example.com".into(),
    mobile: "5551234567".into(),
    ..Contact::default()
  }
}

fn consent() -> NewConsent {
  NewConsent {
    text:       "I agree to share my card".into(),
    version:    "v1".into(),
    ip_address: "127.0.0.1".into(),
    user_agent: "test-agent".into(),
  }
}

/// Always hands out the same slug and counts how often it was asked.
struct FixedSlugs {
  slug:  &'static str,
  calls: AtomicU32,
}

impl FixedSlugs {
  fn new(slug: &'static str) -> Arc<Self> {
    Arc::new(Self {
      slug,
      calls: AtomicU32::new(0),
    })
  }
}

impl SlugSource for FixedSlugs {
  fn next_slug(&self) -> String {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.slug.to_owned()
  }
}

/// Hands out a scripted sequence, then random slugs.
struct ScriptedSlugs(Mutex<VecDeque<&'static str>>);

impl SlugSource for ScriptedSlugs {
  fn next_slug(&self) -> String {
    self
      .0
      .lock()
      .unwrap()
      .pop_front()
      .map_or_else(|| RandomSlugs.next_slug(), str::to_owned)
  }
}

/// Row counts of `(contacts, profiles, consents)`.
async fn row_counts(s: &SqliteStore) -> (i64, i64, i64) {
  s.conn_for_tests()
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT (SELECT COUNT(*) FROM contacts),
                (SELECT COUNT(*) FROM profiles),
                (SELECT COUNT(*) FROM consents)",
        [],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
      )?)
    })
    .await
    .unwrap()
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_contact_normalizes_fields() {
  let s = store().await;
  let mut input = ada();
  input.first_name = "  Ada ".into();
  input.website = "not a url".into();
  input.socials.insert("github".into(), "https://github.com/ada".into());
  input.socials.insert("broken".into(), "::".into());

  let id = s.create_contact(input).await.unwrap();
  let stored = s.get_contact(id).await.unwrap().expect("contact");

  assert_eq!(stored.id, id);
  assert_eq!(stored.contact.first_name, "Ada");
  assert_eq!(stored.contact.mobile, "+15551234567");
  assert!(stored.contact.website.is_empty());
  assert_eq!(stored.contact.socials.len(), 1);
  assert_eq!(stored.contact.socials["github"], "https://github.com/ada");
}

#[tokio::test]
async fn address_survives_storage() {
  let s = store().await;
  let mut input = ada();
  input.address = Address {
    city: "London".into(),
    country: "UK".into(),
    ..Address::default()
  };

  let id = s.create_contact(input.clone()).await.unwrap();
  let stored = s.get_contact(id).await.unwrap().unwrap();
  assert_eq!(stored.contact.address, input.address);
}

#[tokio::test]
async fn create_contact_missing_fields_writes_nothing() {
  let s = store().await;
  let mut input = ada();
  input.email = String::new();
  input.mobile = "   ".into();

  let err = s.create_contact(input).await.unwrap_err();
  match err {
    Error::Core(qrcard_core::Error::Validation { missing }) => {
      assert_eq!(missing, vec!["email", "mobile"]);
    }
    other => panic!("expected validation error, got {other:?}"),
  }
  assert!(s.list_contacts(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_contact_missing_returns_none() {
  let s = store().await;
  assert!(s.get_contact(42).await.unwrap().is_none());
  assert!(s.get_contact_vcard(42).await.unwrap().is_none());
}

#[tokio::test]
async fn list_contacts_newest_first_with_limit() {
  let s = store().await;
  let mut ids = Vec::new();
  for name in ["One", "Two", "Three"] {
    let mut c = ada();
    c.first_name = name.into();
    ids.push(s.create_contact(c).await.unwrap());
  }

  let listed = s.list_contacts(2).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].id, ids[2]);
  assert_eq!(listed[0].first_name, "Three");
  assert_eq!(listed[1].id, ids[1]);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn issue_profile_defaults_public_with_zero_views() {
  let s = store().await;
  let id = s.create_contact(ada()).await.unwrap();

  let profile = s.issue_profile(id).await.unwrap();
  assert!(is_valid_slug(&profile.slug));
  assert!(profile.is_public);
  assert_eq!(profile.view_count, 0);
  assert_eq!(profile.path(), format!("/c/{}", profile.slug));

  let fetched = s.get_profile(&profile.slug).await.unwrap().unwrap();
  assert_eq!(fetched.contact_id, id);
  assert_eq!(fetched.view_count, 0);
}

#[tokio::test]
async fn issue_profile_for_unknown_contact_fails() {
  let s = store().await;
  let err = s.issue_profile(999).await.unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(999)));
}

#[tokio::test]
async fn issued_slugs_are_unique() {
  let s = store().await;
  let id = s.create_contact(ada()).await.unwrap();

  let mut seen = HashSet::new();
  for _ in 0..1000 {
    let profile = s.issue_profile(id).await.unwrap();
    assert!(seen.insert(profile.slug), "duplicate slug issued");
  }
  assert_eq!(seen.len(), 1000);
}

#[tokio::test]
async fn collision_regenerates_slug() {
  let scripted = Arc::new(ScriptedSlugs(Mutex::new(VecDeque::from([
    "aaaaaaaa", "aaaaaaaa", "bbbbbbbb",
  ]))));
  let s = store().await.with_slug_source(scripted);

  let first = s.submit(ada(), consent()).await.unwrap();
  let second = s.submit(ada(), consent()).await.unwrap();
  assert_eq!(first.slug, "aaaaaaaa");
  assert_eq!(second.slug, "bbbbbbbb");
}

// ─── Consent ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_consent_returns_record() {
  let s = store().await;
  let id = s.create_contact(ada()).await.unwrap();

  let record = s.record_consent(id, consent()).await.unwrap();
  assert_eq!(record.contact_id, id);
  assert_eq!(record.text, "I agree to share my card");
  assert_eq!(record.version, "v1");
  assert_eq!(record.ip_address, "127.0.0.1");
  assert_eq!(record.user_agent, "test-agent");

  let listed = s.list_consents(id).await.unwrap();
  assert_eq!(listed, vec![record]);
}

#[tokio::test]
async fn record_consent_for_unknown_contact_fails() {
  let s = store().await;
  let err = s.record_consent(7, consent()).await.unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(7)));
}

#[tokio::test]
async fn record_consent_for_deleted_contact_is_not_found() {
  let s = store().await;
  let id = s.create_contact(ada()).await.unwrap();
  s.conn_for_tests()
    .call(move |conn| {
      conn.execute("DELETE FROM contacts WHERE id = ?1", [id])?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.record_consent(id, consent()).await.unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(found) if found == id));
  assert!(s.list_consents(id).await.unwrap().is_empty());
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_persists_contact_profile_and_consent() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();

  assert!(is_valid_slug(&submission.slug));
  assert_eq!(submission.profile_path(), format!("/c/{}", submission.slug));

  let profile = s.get_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(profile.contact_id, submission.contact_id);

  let consents = s.list_consents(submission.contact_id).await.unwrap();
  assert_eq!(consents.len(), 1);
  assert_eq!(consents[0].text, "I agree to share my card");
  assert_eq!(consents[0].ip_address, "127.0.0.1");
}

#[tokio::test]
async fn submit_missing_email_leaves_no_rows() {
  let s = store().await;
  let mut input = ada();
  input.email = String::new();

  let err = s.submit(input, consent()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(qrcard_core::Error::Validation { ref missing }) if missing == &vec!["email"]
  ));

  assert_eq!(row_counts(&s).await, (0, 0, 0));
}

#[tokio::test]
async fn submit_mobile_without_digits_is_missing() {
  let s = store().await;
  let mut input = ada();
  input.mobile = "n/a".into();

  let err = s.submit(input, consent()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(qrcard_core::Error::Validation { ref missing }) if missing == &vec!["mobile"]
  ));
  assert_eq!(row_counts(&s).await, (0, 0, 0));

  let mut input = ada();
  input.mobile = "+".into();
  assert!(s.create_contact(input).await.is_err());
  assert_eq!(row_counts(&s).await, (0, 0, 0));
}

#[tokio::test]
async fn consent_insert_failure_rolls_back_submission() {
  let s = store().await;
  s.conn_for_tests()
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER reject_consent BEFORE INSERT ON consents
         BEGIN SELECT RAISE(ABORT, 'consent rejected'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.submit(ada(), consent()).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)), "got {err:?}");
  assert_eq!(row_counts(&s).await, (0, 0, 0));
}

#[tokio::test]
async fn slug_exhaustion_rolls_back_contact() {
  let fixed = FixedSlugs::new("zzzzzzzz");
  let s = store().await.with_slug_source(fixed.clone());

  let first = s.submit(ada(), consent()).await.unwrap();
  assert_eq!(first.slug, "zzzzzzzz");

  let err = s.submit(ada(), consent()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(qrcard_core::Error::SlugExhausted { attempts }) if attempts == DEFAULT_SLUG_ATTEMPTS
  ));
  assert_eq!(fixed.calls.load(Ordering::SeqCst), 1 + DEFAULT_SLUG_ATTEMPTS);

  let contacts = s.list_contacts(10).await.unwrap();
  assert_eq!(contacts.len(), 1, "no orphan contact after exhaustion");
  assert_eq!(contacts[0].id, first.contact_id);
}

#[tokio::test]
async fn slug_attempts_is_configurable() {
  let fixed = FixedSlugs::new("yyyyyyyy");
  let s = store()
    .await
    .with_slug_source(fixed.clone())
    .with_slug_attempts(2);

  s.submit(ada(), consent()).await.unwrap();
  let err = s.submit(ada(), consent()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(qrcard_core::Error::SlugExhausted { attempts: 2 })
  ));
  assert_eq!(fixed.calls.load(Ordering::SeqCst), 3);
}

// ─── Public profile and view counting ────────────────────────────────────────

#[tokio::test]
async fn unknown_slug_returns_none_without_counting() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();

  assert!(s.get_public_profile("nosuchsl").await.unwrap().is_none());

  let profile = s.get_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(profile.view_count, 0);
}

#[tokio::test]
async fn public_fetch_increments_view_count() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();

  let first = s.get_public_profile(&submission.slug).await.unwrap().unwrap();
  let second = s.get_public_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(first.view_count, 1);
  assert_eq!(second.view_count, 2);
  assert_eq!(second.contact.id, submission.contact_id);
  assert_eq!(second.contact.contact.first_name, "Ada");

  let profile = s.get_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(profile.view_count, 2);
}

#[tokio::test]
async fn private_profile_is_not_served() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();
  let slug = submission.slug.clone();
  s.conn_for_tests()
    .call(move |conn| {
      conn.execute("UPDATE profiles SET is_public = 0 WHERE slug = ?1", [&slug])?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(s.get_public_profile(&submission.slug).await.unwrap().is_none());
  let profile = s.get_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(profile.view_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fetches_lose_no_updates() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();

  let handles: Vec<_> = (0..50)
    .map(|_| {
      let s = s.clone();
      let slug = submission.slug.clone();
      tokio::spawn(async move { s.get_public_profile(&slug).await })
    })
    .collect();
  for handle in handles {
    assert!(handle.await.unwrap().unwrap().is_some());
  }

  let profile = s.get_profile(&submission.slug).await.unwrap().unwrap();
  assert_eq!(profile.view_count, 50);
}

// ─── vCard ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_vcard() {
  let s = store().await;
  let submission = s.submit(ada(), consent()).await.unwrap();

  let path = submission.profile_path();
  let slug = path.strip_prefix("/c/").expect("profile path prefix");
  assert!(is_valid_slug(slug));

  let card = s
    .get_contact_vcard(submission.contact_id)
    .await
    .unwrap()
    .expect("vcard");
  assert!(card.starts_with("BEGIN:VCARD\r\n"));
  assert!(card.ends_with("END:VCARD"));
  assert!(card.contains("FN:Ada Lovelace\r\n"));
  assert!(card.contains("TEL;TYPE=cell,voice:+15551234567\r\n"));
}
