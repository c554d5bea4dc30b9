//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Socials and the address are
//! stored as compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use qrcard_core::{
  contact::{Address, Contact},
  profile::{ConsentRecord, ContactId, ContactSummary, Profile, StoredContact},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// SQLite integers are signed; a negative counter can only come from outside
/// tampering and reads as zero.
pub fn decode_count(n: i64) -> u64 { u64::try_from(n).unwrap_or_default() }

// ─── Structured columns ──────────────────────────────────────────────────────

pub fn encode_socials(socials: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(socials)?)
}

pub fn decode_socials(s: &str) -> Result<BTreeMap<String, String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_address(address: &Address) -> Result<String> {
  Ok(serde_json::to_string(address)?)
}

pub fn decode_address(s: &str) -> Result<Address> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values for a `contacts` insert, encoded ahead of the database call.
pub struct EncodedContact {
  pub first_name:   String,
  pub last_name:    String,
  pub title:        String,
  pub company:      String,
  pub email:        String,
  pub mobile:       String,
  pub work_phone:   String,
  pub website:      String,
  pub socials_json: String,
  pub address_json: String,
  pub notes:        String,
  pub created_at:   String,
}

impl EncodedContact {
  pub fn new(contact: Contact, created_at: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      socials_json: encode_socials(&contact.socials)?,
      address_json: encode_address(&contact.address)?,
      first_name:   contact.first_name,
      last_name:    contact.last_name,
      title:        contact.title,
      company:      contact.company,
      email:        contact.email,
      mobile:       contact.mobile,
      work_phone:   contact.work_phone,
      website:      contact.website,
      notes:        contact.notes,
      created_at:   encode_dt(created_at),
    })
  }
}

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:           ContactId,
  pub first_name:   String,
  pub last_name:    String,
  pub title:        String,
  pub company:      String,
  pub email:        String,
  pub mobile:       String,
  pub work_phone:   String,
  pub website:      String,
  pub socials_json: String,
  pub address_json: String,
  pub notes:        String,
  pub created_at:   String,
}

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "id, first_name, last_name, title, company, \
                                   email, mobile, work_phone, website, \
                                   socials_json, address_json, notes, created_at";

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      first_name:   row.get(1)?,
      last_name:    row.get(2)?,
      title:        row.get(3)?,
      company:      row.get(4)?,
      email:        row.get(5)?,
      mobile:       row.get(6)?,
      work_phone:   row.get(7)?,
      website:      row.get(8)?,
      socials_json: row.get(9)?,
      address_json: row.get(10)?,
      notes:        row.get(11)?,
      created_at:   row.get(12)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredContact> {
    Ok(StoredContact {
      id:         self.id,
      created_at: decode_dt(&self.created_at)?,
      contact:    Contact {
        first_name: self.first_name,
        last_name:  self.last_name,
        title:      self.title,
        company:    self.company,
        email:      self.email,
        mobile:     self.mobile,
        work_phone: self.work_phone,
        website:    self.website,
        socials:    decode_socials(&self.socials_json)?,
        address:    decode_address(&self.address_json)?,
        notes:      self.notes,
      },
    })
  }
}

/// Raw values for one admin listing row.
pub struct RawSummary {
  pub id:         ContactId,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub mobile:     String,
  pub website:    String,
  pub created_at: String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<ContactSummary> {
    Ok(ContactSummary {
      id:         self.id,
      first_name: self.first_name,
      last_name:  self.last_name,
      email:      self.email,
      mobile:     self.mobile,
      website:    self.website,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub slug:       String,
  pub contact_id: ContactId,
  pub is_public:  bool,
  pub view_count: i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      slug:       self.slug,
      contact_id: self.contact_id,
      is_public:  self.is_public,
      view_count: decode_count(self.view_count),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `consents` row.
pub struct RawConsent {
  pub id:          i64,
  pub contact_id:  ContactId,
  pub text:        String,
  pub version:     String,
  pub ip_address:  String,
  pub user_agent:  String,
  pub recorded_at: String,
}

impl RawConsent {
  pub fn into_record(self) -> Result<ConsentRecord> {
    Ok(ConsentRecord {
      id:          self.id,
      contact_id:  self.contact_id,
      text:        self.text,
      version:     self.version,
      ip_address:  self.ip_address,
      user_agent:  self.user_agent,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
