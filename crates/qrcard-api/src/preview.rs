//! Stateless preview routes: the widget's live vCard and QR renderings.
//!
//! Both normalize the contact first, so the preview matches what a stored
//! card would produce. Nothing is validated or persisted.

use axum::{
  Json,
  http::header,
  response::{IntoResponse, Response},
};
use qrcard_core::{
  contact::Contact,
  qr::{QrOptions, QrRenderer},
};
use serde::Deserialize;

use crate::{contacts::VCARD_CONTENT_TYPE, error::ApiError, qr::SvgRenderer};

/// `POST /api/vcard`. Body: a contact.
pub async fn vcard(Json(contact): Json<Contact>) -> impl IntoResponse {
  let card = qrcard_vcard::build(&contact.normalized());
  ([(header::CONTENT_TYPE, VCARD_CONTENT_TYPE)], card)
}

#[derive(Debug, Deserialize)]
pub struct QrBody {
  pub contact: Contact,
  #[serde(flatten)]
  pub options: QrOptions,
}

/// `POST /api/qr`. Body: `{"contact":{..},"ecc":"M","margin":1,"size":180}`.
pub async fn qr(Json(body): Json<QrBody>) -> Result<Response, ApiError> {
  let payload = qrcard_vcard::qr_payload(&body.contact.normalized());
  let image = SvgRenderer
    .render(&payload, &body.options)
    .map_err(|e| ApiError::Qr(e.to_string()))?;
  Ok(([(header::CONTENT_TYPE, image.media_type)], image.bytes).into_response())
}
