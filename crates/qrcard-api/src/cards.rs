//! Handlers for card creation and public profile pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/qr-cards` | Body: `{"contact":{..},"consent":{"text":".."}}`; 201 on success |
//! | `GET`  | `/c/{slug}` | 404 if unknown or private |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use qrcard_core::{
  contact::Contact,
  profile::{ContactId, NewConsent},
  slug::is_valid_slug,
  store::ProfileStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, client::ClientInfo, contacts::vcard_path, error::ApiError};

/// Consent text recorded when the widget sends none.
pub const DEFAULT_CONSENT_TEXT: &str = "consent";

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ConsentBody {
  #[serde(default)]
  pub text: String,
}

/// Widget submission. Unknown keys (the widget also sends its `qr` styling
/// options) are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub contact: Contact,
  #[serde(default)]
  pub consent: Option<ConsentBody>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
  pub contact_id:  ContactId,
  pub profile_url: String,
}

/// `POST /api/qr-cards`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  client: ClientInfo,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore + 'static,
{
  let text = body
    .consent
    .map(|c| c.text)
    .filter(|t| !t.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_CONSENT_TEXT.to_owned());

  let consent = NewConsent {
    text,
    version: state.consent_version.to_string(),
    ip_address: client.ip_address,
    user_agent: client.user_agent,
  };

  let submission = state
    .store
    .submit(body.contact, consent)
    .await
    .map_err(ApiError::from_store)?;

  Ok((
    StatusCode::CREATED,
    Json(Created {
      contact_id:  submission.contact_id,
      profile_url: submission.profile_path(),
    }),
  ))
}

// ─── Public profile ───────────────────────────────────────────────────────────

/// The public page model: the contact's fields plus links.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
  pub id:         ContactId,
  pub slug:       String,
  #[serde(flatten)]
  pub contact:    Contact,
  pub view_count: u64,
  pub vcard_url:  String,
}

/// `GET /c/{slug}`. Counts one view per successful fetch.
pub async fn public_profile<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<ProfilePage>, ApiError>
where
  S: ProfileStore + 'static,
{
  let not_found = || ApiError::NotFound(format!("profile {slug} not found"));
  if !is_valid_slug(&slug) {
    return Err(not_found());
  }

  let profile = state
    .store
    .get_public_profile(&slug)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;

  let id = profile.contact.id;
  Ok(Json(ProfilePage {
    id,
    slug: profile.slug,
    contact: profile.contact.contact,
    view_count: profile.view_count,
    vcard_url: vcard_path(id),
  }))
}
