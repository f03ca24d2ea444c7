//! Handlers for `/api/follow` — the directed edges of the social graph.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/api/follow` | Authenticated; own edges; `?search=&limit=&offset=` |
//! | `POST`   | `/api/follow` | Authenticated; body `{"following":"<username>"}`; 201 |
//! | `DELETE` | `/api/follow/:id` | Edge's `user` side only; 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  Error,
  follow::{EdgeCandidate, FollowEdge, validate_edge},
  policy::{self, Action},
  store::{ContentStore, FollowQuery, Page},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

// ─── List / search ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive substring over the followed user's username.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /api/follow[?search=...][&limit=...][&offset=...]`
///
/// Lists the requesting principal's outgoing edges only; the search filter
/// applies within that scope, never to the global edge set.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<FollowEdge>>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let user = principal.require_user()?.clone();

  let query = FollowQuery {
    search: params.search,
    page:   Page { limit: params.limit, offset: params.offset },
  };
  let edges = state
    .store
    .list_follows(user.user_id, &query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(edges))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// Username of the principal to follow. The follower side always comes
  /// from the authenticated principal.
  pub following: String,
}

/// `POST /api/follow` — returns 201 + the stored edge.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;
  let user = principal.require_user()?.clone();

  let following = state
    .store
    .get_account(&body.following)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| Error::UserNotFound(body.following.clone()))?;

  let candidate = EdgeCandidate {
    user:      user.user_id,
    following: following.user_id,
  };

  // Fast path: friendly rejection before the write. The schema constraint
  // remains the durable enforcement if a concurrent request races past it.
  let exists = state
    .store
    .follow_exists(candidate)
    .await
    .map_err(ApiError::from_store)?;
  validate_edge(&candidate, exists)?;

  let edge = state
    .store
    .create_follow(candidate)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(edge)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/follow/:id` — only the edge's `user` side may remove it.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path(follow_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;

  let edge = state
    .store
    .get_follow(follow_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(Error::FollowNotFound(follow_id))?;
  policy::authorize(&principal, Action::Write, Some(&edge))?;

  state
    .store
    .delete_follow(follow_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
