//! SVG implementation of the [`QrRenderer`] seam, built on `qrcode`.

use qrcard_core::qr::{EccLevel, QrOptions, QrRenderer, RenderedQr};
use qrcode::{EcLevel, QrCode, render::svg, types::QrError};

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

/// Renders payloads as standalone SVG documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

fn ec_level(ecc: EccLevel) -> EcLevel {
  match ecc {
    EccLevel::L => EcLevel::L,
    EccLevel::M => EcLevel::M,
    EccLevel::Q => EcLevel::Q,
    EccLevel::H => EcLevel::H,
  }
}

impl QrRenderer for SvgRenderer {
  type Error = QrError;

  fn render(&self, payload: &str, options: &QrOptions) -> Result<RenderedQr, QrError> {
    let code = QrCode::with_error_correction_level(payload, ec_level(options.ecc))?;
    // `qrcode` only knows a fixed four-module quiet zone; any margin turns it on.
    let image = code
      .render::<svg::Color<'_>>()
      .min_dimensions(options.size, options.size)
      .quiet_zone(options.margin > 0)
      .dark_color(svg::Color("#000000"))
      .light_color(svg::Color("#ffffff"))
      .build();
    Ok(RenderedQr {
      media_type: SVG_MEDIA_TYPE,
      bytes:      image.into_bytes(),
    })
  }
}
