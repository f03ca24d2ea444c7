//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The core taxonomy is preserved end to end; this module only decides the
//! transport status for each kind. `Unauthenticated` (401) and `NotOwner`
//! (403) stay distinct so clients can tell "re-authenticate" apart from
//! "never retry".

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use quill_core::Error;
use serde_json::json;

/// An error returned by an API handler. Thin wrapper over the core taxonomy
/// so `?` works on core results inside handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  /// Funnel a backend error through the core taxonomy.
  pub fn from_store<E: Into<Error>>(err: E) -> Self { Self(err.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::Unauthenticated => StatusCode::UNAUTHORIZED,
      Error::NotOwner => StatusCode::FORBIDDEN,
      Error::PostNotFound(_)
      | Error::CommentNotFound(_)
      | Error::GroupNotFound(_)
      | Error::FollowNotFound(_) => StatusCode::NOT_FOUND,
      Error::UserNotFound(_)
      | Error::SelfFollow
      | Error::DuplicateFollow
      | Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut res =
      (status, Json(json!({ "error": self.0.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"quill\""),
      );
    }
    res
  }
}
