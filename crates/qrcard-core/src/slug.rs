//! Profile slug generation.

use rand_core::{OsRng, RngCore};

/// Characters a slug is drawn from.
pub const SLUG_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Number of characters in a slug.
pub const SLUG_LEN: usize = 8;

// Largest multiple of the alphabet size that fits in a byte; bytes at or
// above it are rejected so every character is equally likely.
const REJECT_AT: u8 = 252;

/// A source of candidate slugs. The store retries on collision, so a source
/// only has to produce well-formed tokens, not unique ones.
pub trait SlugSource: Send + Sync {
  fn next_slug(&self) -> String;
}

/// Uniformly random slugs from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSlugs;

impl SlugSource for RandomSlugs {
  fn next_slug(&self) -> String {
    let mut slug = String::with_capacity(SLUG_LEN);
    let mut buf = [0u8; 16];
    while slug.len() < SLUG_LEN {
      OsRng.fill_bytes(&mut buf);
      for b in buf.into_iter().filter(|b| *b < REJECT_AT) {
        if slug.len() == SLUG_LEN {
          break;
        }
        slug.push(char::from(SLUG_ALPHABET[usize::from(b) % SLUG_ALPHABET.len()]));
      }
    }
    slug
  }
}

/// `true` if `s` has the shape of an issued slug.
pub fn is_valid_slug(s: &str) -> bool {
  s.len() == SLUG_LEN && s.bytes().all(|b| SLUG_ALPHABET.contains(&b))
}
