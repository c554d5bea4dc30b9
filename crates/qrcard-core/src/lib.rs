//! Core types and trait definitions for QR Card.
//!
//! This crate has no HTTP or database dependencies. It owns the contact data
//! model, the field normalizer, slug generation, and the [`ProfileStore`] and
//! [`QrRenderer`] seams that backend and delivery crates implement.
//!
//! [`ProfileStore`]: store::ProfileStore
//! [`QrRenderer`]: qr::QrRenderer

pub mod contact;
pub mod error;
pub mod normalize;
pub mod profile;
pub mod qr;
pub mod slug;
pub mod store;

pub use error::{Error, Result};
