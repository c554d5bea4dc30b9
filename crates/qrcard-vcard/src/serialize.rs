//! vCard 4.0 builder.
//!
//! Emits a fixed property order with CRLF separators. Empty optional
//! properties are left out entirely. The output carries no UID, REV or other
//! time-dependent data, so the same contact always yields the same bytes.

use qrcard_core::{
  contact::{Address, Contact},
  normalize::escape_vcard_text as esc,
};

const CRLF: &str = "\r\n";

/// `first + " " + last`, trimmed. With both names empty the separating space
/// is all that is left, and it is kept.
fn formatted_name(first: &str, last: &str) -> String {
  let full = format!("{first} {last}");
  match full.trim() {
    "" => full,
    trimmed => trimmed.to_owned(),
  }
}

/// Push `NAME:value` when `value` is non-empty.
fn push_text(lines: &mut Vec<String>, name: &str, value: &str) {
  if !value.is_empty() {
    lines.push(format!("{name}:{}", esc(value)));
  }
}

/// Structured `ADR` value; empty subfields keep their positional slot.
fn adr_value(a: &Address) -> String {
  format!(
    ";;{};{};{};{};{}",
    esc(&a.street),
    esc(&a.city),
    esc(&a.region),
    esc(&a.postal_code),
    esc(&a.country)
  )
}

/// Build the vCard text for `contact`.
pub fn build(contact: &Contact) -> String {
  let mut lines: Vec<String> = Vec::with_capacity(13);

  lines.push("BEGIN:VCARD".to_owned());
  lines.push("VERSION:4.0".to_owned());
  lines.push(format!(
    "N:{};{};;;",
    esc(&contact.last_name),
    esc(&contact.first_name)
  ));
  lines.push(format!(
    "FN:{}",
    esc(&formatted_name(&contact.first_name, &contact.last_name))
  ));
  push_text(&mut lines, "ORG", &contact.company);
  push_text(&mut lines, "TITLE", &contact.title);
  push_text(&mut lines, "EMAIL;TYPE=work", &contact.email);
  push_text(&mut lines, "TEL;TYPE=cell,voice", &contact.mobile);
  push_text(&mut lines, "TEL;TYPE=work,voice", &contact.work_phone);
  push_text(&mut lines, "URL", &contact.website);
  if !contact.address.is_empty() {
    lines.push(format!("ADR;TYPE=work:{}", adr_value(&contact.address)));
  }
  push_text(&mut lines, "NOTE", &contact.notes);
  lines.push("END:VCARD".to_owned());

  lines.join(CRLF)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
