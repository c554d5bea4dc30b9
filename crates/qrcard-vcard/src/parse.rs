//! vCard reader for the properties the builder emits.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_lines()          → Vec<String>
//!          └─ parse_content_line() → ContentLine
//!               └─ apply()           → fields on a Contact
//!
//! Unknown properties are skipped, so cards from other producers read back
//! whatever subset maps onto a [`Contact`].

use qrcard_core::contact::Contact;

use crate::error::{Error, Result};

// ─── Content-line representation ─────────────────────────────────────────────

struct ContentLine {
  name:   String,
  params: Vec<Param>,
  value:  String,
}

struct Param {
  name:  String,
  value: String,
}

impl ContentLine {
  /// All `TYPE=` values, upper-cased, handling `TYPE=A,B`.
  fn types(&self) -> Vec<String> {
    self
      .params
      .iter()
      .filter(|p| p.name == "TYPE")
      .flat_map(|p| p.value.split(','))
      .map(|t| t.trim().to_uppercase())
      .filter(|t| !t.is_empty())
      .collect()
  }
}

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Join CRLF+SP (or LF+SP / LF+HT) continuation lines (RFC 6350 §3.2).
/// Tolerates bare LF line endings.
pub(crate) fn unfold_lines(s: &str) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  for raw in s.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if let Some(rest) = line.strip_prefix([' ', '\t']) {
      if let Some(last) = lines.last_mut() {
        last.push_str(rest);
      }
    } else {
      lines.push(line.to_owned());
    }
  }
  lines.retain(|l| !l.is_empty());
  lines
}

/// Find the first `:` that is not inside a double-quoted parameter value.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

fn parse_content_line(line: &str) -> Result<ContentLine> {
  let colon = find_unquoted_colon(line)
    .ok_or_else(|| Error::MalformedContentLine(line.to_owned()))?;

  let mut tokens = line[..colon].split(';');
  let name_raw = tokens.next().unwrap_or_default().trim();
  if name_raw.is_empty() {
    return Err(Error::MalformedContentLine(line.to_owned()));
  }
  // Strip a group prefix ("item1.TEL" → "TEL").
  let name = name_raw
    .rsplit_once('.')
    .map_or(name_raw, |(_, n)| n)
    .to_uppercase();

  let params = tokens
    .filter(|t| !t.trim().is_empty())
    .map(|token| match token.split_once('=') {
      Some((k, v)) => Param {
        name:  k.trim().to_uppercase(),
        value: v.trim().trim_matches('"').to_owned(),
      },
      // Bare token: vCard 3.0 shorthand for TYPE=token.
      None => Param {
        name:  "TYPE".to_owned(),
        value: token.trim().to_owned(),
      },
    })
    .collect();

  Ok(ContentLine {
    name,
    params,
    value: line[colon + 1..].to_owned(),
  })
}

// ─── Value helpers ───────────────────────────────────────────────────────────

/// Inverse of the builder's text escaping: `\n`/`\N`, `\\`, `\,`, `\;`.
/// Unknown escapes are kept verbatim.
pub fn unescape_vcard_text(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('n' | 'N') => out.push('\n'),
      Some(e @ ('\\' | ',' | ';')) => out.push(e),
      Some(other) => {
        out.push('\\');
        out.push(other);
      }
      None => out.push('\\'),
    }
  }
  out
}

/// Split a structured value (`N`, `ADR`) on unescaped `;` and unescape each
/// component.
fn split_components(value: &str) -> Vec<String> {
  let mut parts = Vec::new();
  let mut current = String::new();
  let mut chars = value.chars();
  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        current.push(c);
        if let Some(next) = chars.next() {
          current.push(next);
        }
      }
      ';' => parts.push(unescape_vcard_text(&std::mem::take(&mut current))),
      _ => current.push(c),
    }
  }
  parts.push(unescape_vcard_text(&current));
  parts
}

fn component(parts: &[String], idx: usize) -> String {
  parts.get(idx).cloned().unwrap_or_default()
}

// ─── Core reader ─────────────────────────────────────────────────────────────

fn apply(contact: &mut Contact, full_name: &mut Option<String>, line: &ContentLine) {
  let text = || unescape_vcard_text(&line.value);
  match line.name.as_str() {
    "N" => {
      let parts = split_components(&line.value);
      contact.last_name = component(&parts, 0);
      contact.first_name = component(&parts, 1);
    }
    "FN" => *full_name = Some(text()),
    "ORG" => contact.company = text(),
    "TITLE" => contact.title = text(),
    "EMAIL" if contact.email.is_empty() => contact.email = text(),
    "TEL" => {
      let types = line.types();
      let is_work = types.iter().any(|t| t == "WORK");
      let is_cell = types.iter().any(|t| t == "CELL");
      if is_work && !is_cell {
        if contact.work_phone.is_empty() {
          contact.work_phone = text();
        }
      } else if contact.mobile.is_empty() {
        contact.mobile = text();
      }
    }
    "URL" if contact.website.is_empty() => contact.website = text(),
    "ADR" => {
      let parts = split_components(&line.value);
      contact.address.street = component(&parts, 2);
      contact.address.city = component(&parts, 3);
      contact.address.region = component(&parts, 4);
      contact.address.postal_code = component(&parts, 5);
      contact.address.country = component(&parts, 6);
    }
    "NOTE" => contact.notes = text(),
    _ => {}
  }
}

/// Read the first `BEGIN:VCARD … END:VCARD` block in `input`.
pub fn parse_one(input: &str) -> Result<Contact> {
  let lines = unfold_lines(input);

  let start = lines
    .iter()
    .position(|l| l.eq_ignore_ascii_case("BEGIN:VCARD"))
    .ok_or(Error::MissingEnvelope)?;
  let end = lines[start + 1..]
    .iter()
    .position(|l| l.eq_ignore_ascii_case("END:VCARD"))
    .map(|offset| start + 1 + offset)
    .ok_or(Error::MissingEnvelope)?;

  let mut contact = Contact::default();
  let mut full_name = None;
  for raw in &lines[start + 1..end] {
    let line = parse_content_line(raw)?;
    apply(&mut contact, &mut full_name, &line);
  }

  // Cards without `N`: fall back to the formatted name.
  if contact.first_name.is_empty() && contact.last_name.is_empty() {
    contact.first_name = full_name.unwrap_or_default().trim().to_owned();
  }

  Ok(contact)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  // ── Envelope ────────────────────────────────────────────────────────────────

  #[test]
  fn missing_envelope_returns_error() {
    assert!(matches!(parse_one("FN:Alice"), Err(Error::MissingEnvelope)));
    assert!(matches!(
      parse_one("BEGIN:VCARD\r\nFN:Alice\r\n"),
      Err(Error::MissingEnvelope)
    ));
  }

  #[test]
  fn line_without_colon_is_malformed() {
    let r = parse_one("BEGIN:VCARD\r\nVERSION:4.0\r\nGARBAGE\r\nEND:VCARD");
    assert!(matches!(r, Err(Error::MalformedContentLine(l)) if l == "GARBAGE"));
  }

  // ── Names ───────────────────────────────────────────────────────────────────

  #[test]
  fn n_sets_first_and_last() {
    let c = parse_one("BEGIN:VCARD\r\nN:Lovelace;Ada;;;\r\nFN:Ada Lovelace\r\nEND:VCARD")
      .unwrap();
    assert_eq!(c.first_name, "Ada");
    assert_eq!(c.last_name, "Lovelace");
  }

  #[test]
  fn fn_only_falls_back_to_first_name() {
    let c = parse_one("BEGIN:VCARD\nVERSION:4.0\nFN:Prince\nEND:VCARD\n").unwrap();
    assert_eq!(c.first_name, "Prince");
    assert!(c.last_name.is_empty());
  }

  // ── Phones ──────────────────────────────────────────────────────────────────

  #[test]
  fn tel_types_route_to_mobile_and_work() {
    let input = "BEGIN:VCARD\r\n\
                 TEL;TYPE=work,voice:+442071838750\r\n\
                 TEL;TYPE=cell,voice:+15551234567\r\n\
                 END:VCARD";
    let c = parse_one(input).unwrap();
    assert_eq!(c.mobile, "+15551234567");
    assert_eq!(c.work_phone, "+442071838750");
  }

  #[test]
  fn grouped_and_bare_type_params_are_understood() {
    let input = "BEGIN:VCARD\r\nitem1.TEL;WORK:+1555\r\nEND:VCARD";
    let c = parse_one(input).unwrap();
    assert_eq!(c.work_phone, "+1555");
  }

  // ── Structured values ───────────────────────────────────────────────────────

  #[test]
  fn adr_components_keep_positions() {
    let input = "BEGIN:VCARD\r\nADR;TYPE=work:;;1 Main\\; Suite 4;Springfield;;62701;\r\nEND:VCARD";
    let c = parse_one(input).unwrap();
    assert_eq!(c.address.street, "1 Main; Suite 4");
    assert_eq!(c.address.city, "Springfield");
    assert!(c.address.region.is_empty());
    assert_eq!(c.address.postal_code, "62701");
    assert!(c.address.country.is_empty());
  }

  #[test]
  fn folded_lines_are_unfolded() {
    let input = "BEGIN:VCARD\r\nNOTE:first half\r\n  second half\r\nEND:VCARD";
    let c = parse_one(input).unwrap();
    assert_eq!(c.notes, "first half second half");
  }

  // ── Escaping ────────────────────────────────────────────────────────────────

  #[test]
  fn unescape_handles_all_sequences() {
    assert_eq!(
      unescape_vcard_text(r#"Jane\; "Doe"\,\nCEO"#),
      "Jane; \"Doe\",\nCEO"
    );
    assert_eq!(unescape_vcard_text(r"a\\nb"), r"a\nb");
    assert_eq!(unescape_vcard_text(r"keep\x"), r"keep\x");
    assert_eq!(unescape_vcard_text("trailing\\"), "trailing\\");
  }

  #[test]
  fn split_components_respects_escapes() {
    assert_eq!(
      split_components(r"a\;b;c\\;d"),
      vec!["a;b".to_owned(), r"c\".to_owned(), "d".to_owned()]
    );
  }
}
