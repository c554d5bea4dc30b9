//! The QR rendering seam.
//!
//! The core only produces the payload text. Turning it into an image is the
//! job of a [`QrRenderer`] supplied by the delivery layer; the options here
//! are passed through to it untouched.

use serde::{Deserialize, Serialize};

/// QR error-correction level.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum EccLevel {
  L,
  #[default]
  M,
  Q,
  H,
}

/// Rendering options forwarded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
  pub ecc:    EccLevel,
  /// Quiet-zone toggle: `0` disables it, any other value enables the
  /// renderer's standard quiet zone.
  pub margin: u32,
  /// Minimum edge length of the output, in pixels.
  pub size:   u32,
}

impl Default for QrOptions {
  fn default() -> Self {
    Self {
      ecc:    EccLevel::M,
      margin: 1,
      size:   180,
    }
  }
}

/// An encoded QR image. The core never looks inside `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQr {
  pub media_type: &'static str,
  pub bytes:      Vec<u8>,
}

/// Renders a payload into an image.
pub trait QrRenderer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn render(
    &self,
    payload: &str,
    options: &QrOptions,
  ) -> Result<RenderedQr, Self::Error>;
}
