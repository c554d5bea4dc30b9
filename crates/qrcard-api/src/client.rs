//! Request-context extractor for consent logging.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::{header, request::Parts},
};

/// Who submitted a request: peer IP and `User-Agent`.
///
/// Both are empty strings when unavailable, e.g. when the router is not
/// served with `into_make_service_with_connect_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
  pub ip_address: String,
  pub user_agent: String,
}

impl<S> FromRequestParts<S> for ClientInfo
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let ip_address = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip().to_string())
      .unwrap_or_default();
    let user_agent = parts
      .headers
      .get(header::USER_AGENT)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_owned();
    Ok(Self {
      ip_address,
      user_agent,
    })
  }
}
