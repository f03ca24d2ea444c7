//! Identity Context — resolves the acting principal for a request.
//!
//! HTTP Basic credentials are verified against the stored argon2 hash for
//! the named user. A missing Authorization header resolves to the anonymous
//! principal (reads are public); a present-but-invalid one is rejected
//! outright. The resolved [`Principal`] is a plain value passed into the
//! core decision functions, never ambient state.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use quill_core::{Error, principal::Principal, store::ContentStore};

use crate::{AppState, error::ApiError};

/// Extractor yielding the request's [`Principal`].
#[derive(Debug)]
pub struct Identity(pub Principal);

/// Split a `Basic` Authorization header value into username and password.
fn parse_basic(header_val: &str) -> Result<(String, String), Error> {
  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthenticated)?;
  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthenticated)?;
  let creds = String::from_utf8(decoded).map_err(|_| Error::Unauthenticated)?;
  let (username, password) =
    creds.split_once(':').ok_or(Error::Unauthenticated)?;
  Ok((username.to_string(), password.to_string()))
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(header_val) = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
    else {
      return Ok(Identity(Principal::Anonymous));
    };

    let (username, password) = parse_basic(header_val)?;

    let account = state
      .store
      .get_account(&username)
      .await
      .map_err(ApiError::from_store)?
      .ok_or(Error::Unauthenticated)?;

    let parsed_hash = PasswordHash::new(&account.password_hash)
      .map_err(|_| Error::Unauthenticated)?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| Error::Unauthenticated)?;

    Ok(Identity(Principal::User(account.user_ref())))
  }
}
