//! Handlers for stored contacts: vCard download and the admin listing.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use qrcard_core::{
  profile::{ContactId, ContactSummary},
  store::{DEFAULT_LIST_LIMIT, ProfileStore},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

pub const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

/// Download URL for a contact's vCard.
pub fn vcard_path(id: ContactId) -> String { format!("/api/contacts/{id}.vcf") }

/// Parse `"{id}.vcf"` into a contact id.
pub fn parse_vcf_name(id_vcf: &str) -> Result<ContactId, ApiError> {
  id_vcf
    .strip_suffix(".vcf")
    .and_then(|id| id.parse().ok())
    .ok_or_else(|| ApiError::NotFound(format!("no vCard at {id_vcf}")))
}

// ─── vCard download ───────────────────────────────────────────────────────────

/// `GET /api/contacts/{id}.vcf`
pub async fn vcard<S>(
  State(state): State<AppState<S>>,
  Path(id_vcf): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ProfileStore + 'static,
{
  let id = parse_vcf_name(&id_vcf)?;
  let card = state
    .store
    .get_contact_vcard(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;

  let etag = compute_etag(&card);
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  Ok(
    (
      [
        (header::CONTENT_TYPE, VCARD_CONTENT_TYPE.to_owned()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"contact_{id}.vcf\""),
        ),
        (header::ETAG, etag),
      ],
      card,
    )
      .into_response(),
  )
}

// ─── Admin listing ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactList {
  pub contacts: Vec<ContactSummary>,
}

/// `GET /api/admin/contacts[?limit=<n>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ContactList>, ApiError>
where
  S: ProfileStore + 'static,
{
  let contacts = state
    .store
    .list_contacts(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ContactList { contacts }))
}
