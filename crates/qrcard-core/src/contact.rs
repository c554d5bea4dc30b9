//! Contact: the root entity collected by the form and persisted by the
//! profile store.
//!
//! Every field is a plain string; an empty string means "not provided". JSON
//! field names are camelCase to match the form widget's payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  normalize::{normalize_phone, sanitize_url},
};

// ─── Address ─────────────────────────────────────────────────────────────────

/// A postal address (maps to the vCard `ADR` property).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
  pub street:      String,
  /// City or locality.
  pub city:        String,
  /// State, province, or region. The widget sends this as `state`.
  #[serde(alias = "state")]
  pub region:      String,
  #[serde(alias = "postal")]
  pub postal_code: String,
  pub country:     String,
}

impl Address {
  /// `true` when every subfield is empty.
  pub fn is_empty(&self) -> bool {
    self.street.is_empty()
      && self.city.is_empty()
      && self.region.is_empty()
      && self.postal_code.is_empty()
      && self.country.is_empty()
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// The contact card. Immutable once persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
  pub first_name: String,
  pub last_name:  String,
  pub title:      String,
  pub company:    String,
  pub email:      String,
  pub mobile:     String,
  pub work_phone: String,
  pub website:    String,
  /// Platform name (e.g. `linkedin`) to profile URL.
  pub socials:    BTreeMap<String, String>,
  pub address:    Address,
  pub notes:      String,
}

impl Contact {
  /// JSON names of the required fields that are missing or blank.
  pub fn missing_required(&self) -> Vec<&'static str> {
    [
      ("firstName", &self.first_name),
      ("lastName", &self.last_name),
      ("email", &self.email),
      ("mobile", &self.mobile),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
  }

  /// Check the fields required for persistence.
  pub fn validate(&self) -> Result<()> {
    let missing = self.missing_required();
    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation { missing })
    }
  }

  /// Clean raw form input: trim every text field, reformat phone numbers, and
  /// sanitize URLs. Unparseable URLs become empty strings; socials whose URL
  /// is dropped are removed.
  pub fn normalized(self) -> Self {
    let Self {
      first_name,
      last_name,
      title,
      company,
      email,
      mobile,
      work_phone,
      website,
      socials,
      address,
      notes,
    } = self;

    let socials = socials
      .into_iter()
      .filter_map(|(platform, url)| {
        let url = sanitize_url(&url);
        (!url.is_empty()).then(|| (platform.trim().to_owned(), url))
      })
      .collect();

    Self {
      first_name: trimmed(first_name),
      last_name: trimmed(last_name),
      title: trimmed(title),
      company: trimmed(company),
      email: trimmed(email),
      mobile: normalize_phone(&mobile),
      work_phone: normalize_phone(&work_phone),
      website: sanitize_url(&website),
      socials,
      address: Address {
        street:      trimmed(address.street),
        city:        trimmed(address.city),
        region:      trimmed(address.region),
        postal_code: trimmed(address.postal_code),
        country:     trimmed(address.country),
      },
      notes: trimmed(notes),
    }
  }
}

fn trimmed(s: String) -> String {
  let t = s.trim();
  if t.len() == s.len() { s } else { t.to_owned() }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
