//! [`SqliteStore`], the SQLite implementation of [`ProfileStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::{info, warn};

use qrcard_core::{
  contact::Contact,
  profile::{
    ConsentRecord, ContactId, ContactSummary, NewConsent, Profile,
    PublicProfile, StoredContact, Submission,
  },
  slug::{RandomSlugs, SlugSource},
  store::{DEFAULT_SLUG_ATTEMPTS, ProfileStore},
};

use crate::{
  Error, Result,
  encode::{
    CONTACT_COLUMNS, EncodedContact, RawConsent, RawContact, RawProfile,
    RawSummary, decode_count, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A QR Card profile store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and slug source are
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:          tokio_rusqlite::Connection,
  slugs:         Arc<dyn SlugSource>,
  slug_attempts: u32,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      slugs: Arc::new(RandomSlugs),
      slug_attempts: DEFAULT_SLUG_ATTEMPTS,
    })
  }

  /// Replace the slug generator.
  pub fn with_slug_source(mut self, slugs: Arc<dyn SlugSource>) -> Self {
    self.slugs = slugs;
    self
  }

  /// Number of slugs tried before issuance fails. Clamped to at least one.
  pub fn with_slug_attempts(mut self, attempts: u32) -> Self {
    self.slug_attempts = attempts.max(1);
    self
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run on the connection thread and take `&Connection` so they work both
// on the bare connection and inside a `Transaction`.

fn contact_exists(conn: &rusqlite::Connection, id: ContactId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM contacts WHERE id = ?1", [id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn insert_contact(
  conn: &rusqlite::Connection,
  c: &EncodedContact,
) -> rusqlite::Result<ContactId> {
  conn.execute(
    "INSERT INTO contacts (
       first_name, last_name, title, company, email, mobile, work_phone,
       website, socials_json, address_json, notes, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      c.first_name,
      c.last_name,
      c.title,
      c.company,
      c.email,
      c.mobile,
      c.work_phone,
      c.website,
      c.socials_json,
      c.address_json,
      c.notes,
      c.created_at,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Insert a profile row, drawing a fresh slug on every UNIQUE collision.
///
/// Returns `None` once `attempts` slugs have collided. A failed INSERT only
/// aborts its own statement, so this is safe inside an open transaction.
fn insert_profile(
  conn: &rusqlite::Connection,
  slugs: &dyn SlugSource,
  attempts: u32,
  contact_id: ContactId,
  now: &str,
) -> rusqlite::Result<Option<String>> {
  for attempt in 1..=attempts {
    let slug = slugs.next_slug();
    let inserted = conn.execute(
      "INSERT INTO profiles (slug, contact_id, is_public, view_count, created_at, updated_at)
       VALUES (?1, ?2, 1, 0, ?3, ?3)",
      rusqlite::params![slug, contact_id, now],
    );
    match inserted {
      Ok(_) => return Ok(Some(slug)),
      Err(e) if is_unique_violation(&e) => {
        warn!(%slug, attempt, attempts, "slug collision, regenerating");
      }
      Err(e) => return Err(e),
    }
  }
  Ok(None)
}

fn insert_consent(
  conn: &rusqlite::Connection,
  contact_id: ContactId,
  consent: &NewConsent,
  now: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO consents (contact_id, consent_text, version, ip_address, user_agent, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      contact_id,
      consent.text,
      consent.version,
      consent.ip_address,
      consent.user_agent,
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn select_contact(
  conn: &rusqlite::Connection,
  id: ContactId,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
      [id],
      RawContact::from_row,
    )
    .optional()
}

fn select_profile(
  conn: &rusqlite::Connection,
  slug: &str,
) -> rusqlite::Result<Option<RawProfile>> {
  conn
    .query_row(
      "SELECT slug, contact_id, is_public, view_count, created_at, updated_at
       FROM profiles WHERE slug = ?1",
      [slug],
      |row| {
        Ok(RawProfile {
          slug:       row.get(0)?,
          contact_id: row.get(1)?,
          is_public:  row.get(2)?,
          view_count: row.get(3)?,
          created_at: row.get(4)?,
          updated_at: row.get(5)?,
        })
      },
    )
    .optional()
}

fn exhausted(attempts: u32) -> Error {
  Error::Core(qrcard_core::Error::SlugExhausted { attempts })
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_contact(&self, contact: Contact) -> Result<ContactId> {
    let contact = contact.normalized();
    contact.validate()?;
    let encoded = EncodedContact::new(contact, Utc::now())?;

    let id = self
      .conn
      .call(move |conn| Ok(insert_contact(conn, &encoded)?))
      .await?;
    Ok(id)
  }

  async fn issue_profile(&self, contact_id: ContactId) -> Result<Profile> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let slugs = Arc::clone(&self.slugs);
    let attempts = self.slug_attempts;

    let issued: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        if !contact_exists(conn, contact_id)? {
          return Ok(None);
        }
        Ok(Some(insert_profile(
          conn,
          slugs.as_ref(),
          attempts,
          contact_id,
          &now_str,
        )?))
      })
      .await?;

    let slug = issued
      .ok_or(Error::ContactNotFound(contact_id))?
      .ok_or_else(|| exhausted(attempts))?;

    Ok(Profile {
      slug,
      contact_id,
      is_public: true,
      view_count: 0,
      created_at: now,
      updated_at: now,
    })
  }

  async fn record_consent(
    &self,
    contact_id: ContactId,
    consent: NewConsent,
  ) -> Result<ConsentRecord> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let row = consent.clone();
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !contact_exists(&tx, contact_id)? {
          return Ok(None);
        }
        let id = insert_consent(&tx, contact_id, &row, &now_str)?;
        tx.commit()?;
        Ok(Some(id))
      })
      .await?
      .ok_or(Error::ContactNotFound(contact_id))?;

    let NewConsent {
      text,
      version,
      ip_address,
      user_agent,
    } = consent;
    Ok(ConsentRecord {
      id,
      contact_id,
      text,
      version,
      ip_address,
      user_agent,
      recorded_at: now,
    })
  }

  async fn submit(&self, contact: Contact, consent: NewConsent) -> Result<Submission> {
    // Required fields are checked after normalization, which can empty them.
    let contact = contact.normalized();
    contact.validate()?;
    let now = Utc::now();
    let now_str = encode_dt(now);
    let encoded = EncodedContact::new(contact, now)?;
    let slugs = Arc::clone(&self.slugs);
    let attempts = self.slug_attempts;

    let submitted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let contact_id = insert_contact(&tx, &encoded)?;
        // Dropping `tx` without committing rolls the contact back.
        let Some(slug) =
          insert_profile(&tx, slugs.as_ref(), attempts, contact_id, &now_str)?
        else {
          return Ok(None);
        };
        insert_consent(&tx, contact_id, &consent, &now_str)?;
        tx.commit()?;
        Ok(Some(Submission { contact_id, slug }))
      })
      .await?;

    let submission = submitted.ok_or_else(|| exhausted(attempts))?;
    info!(
      contact_id = submission.contact_id,
      slug = %submission.slug,
      "contact submitted"
    );
    Ok(submission)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_public_profile<'a>(
    &'a self,
    slug: &'a str,
  ) -> Result<Option<PublicProfile>> {
    let slug_owned = slug.to_owned();
    let now_str = encode_dt(Utc::now());

    let hit: Option<(i64, RawContact)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE profiles
           SET view_count = view_count + 1, updated_at = ?2
           WHERE slug = ?1 AND is_public = 1",
          rusqlite::params![slug_owned, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let (view_count, contact_id): (i64, ContactId) = tx.query_row(
          "SELECT view_count, contact_id FROM profiles WHERE slug = ?1",
          [&slug_owned],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let contact = select_contact(&tx, contact_id)?;
        tx.commit()?;
        Ok(contact.map(|c| (view_count, c)))
      })
      .await?;

    hit
      .map(|(view_count, raw)| {
        Ok(PublicProfile {
          slug:       slug.to_owned(),
          view_count: decode_count(view_count),
          contact:    raw.into_stored()?,
        })
      })
      .transpose()
  }

  async fn get_profile<'a>(&'a self, slug: &'a str) -> Result<Option<Profile>> {
    let slug = slug.to_owned();
    let raw = self
      .conn
      .call(move |conn| Ok(select_profile(conn, &slug)?))
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<StoredContact>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_contact(conn, id)?))
      .await?;
    raw.map(RawContact::into_stored).transpose()
  }

  async fn get_contact_vcard(&self, id: ContactId) -> Result<Option<String>> {
    Ok(
      self
        .get_contact(id)
        .await?
        .map(|stored| qrcard_vcard::build(&stored.contact)),
    )
  }

  async fn list_consents(&self, contact_id: ContactId) -> Result<Vec<ConsentRecord>> {
    let raws: Vec<RawConsent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, contact_id, consent_text, version, ip_address, user_agent, recorded_at
           FROM consents WHERE contact_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map([contact_id], |row| {
            Ok(RawConsent {
              id:          row.get(0)?,
              contact_id:  row.get(1)?,
              text:        row.get(2)?,
              version:     row.get(3)?,
              ip_address:  row.get(4)?,
              user_agent:  row.get(5)?,
              recorded_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConsent::into_record).collect()
  }

  async fn list_contacts(&self, limit: usize) -> Result<Vec<ContactSummary>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, first_name, last_name, email, mobile, website, created_at
           FROM contacts ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map([limit], |row| {
            Ok(RawSummary {
              id:         row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
              email:      row.get(3)?,
              mobile:     row.get(4)?,
              website:    row.get(5)?,
              created_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }
}
