//! vCard codec for QR Card contacts.
//!
//! [`build`] turns a [`Contact`] into the vCard 4.0 text that is both the
//! downloadable `.vcf` body and the QR payload. [`parse`] reads such a card
//! back. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use qrcard_core::contact::Contact;
//!
//! let contact = Contact {
//!   first_name: "Ada".into(),
//!   last_name: "Lovelace".into(),
//!   ..Contact::default()
//! };
//! let card = qrcard_vcard::build(&contact);
//! assert!(card.starts_with("BEGIN:VCARD\r\n"));
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
pub use parse::unescape_vcard_text;
pub use qrcard_core::normalize::escape_vcard_text;
use qrcard_core::contact::Contact;
pub use serialize::build;

/// The text a QR code for `contact` encodes: the vCard body itself.
pub fn qr_payload(contact: &Contact) -> String { build(contact) }

/// Parse the first vCard in `input` back into a [`Contact`].
///
/// Only the properties [`build`] emits are read; socials are not part of the
/// card and come back empty.
pub fn parse(input: &str) -> Result<Contact> { parse::parse_one(input) }

// ─── Round-trip test ─────────────────────────────────────────────────────────
