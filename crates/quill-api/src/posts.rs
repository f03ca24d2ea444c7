//! Handlers for `/api/posts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/api/posts` | Public; `?limit=&offset=`, newest first |
//! | `POST`   | `/api/posts` | Authenticated; body [`CreateBody`]; 201 |
//! | `GET`    | `/api/posts/:id` | Public; 404 if missing |
//! | `PUT`/`PATCH` | `/api/posts/:id` | Owner only; partial update |
//! | `DELETE` | `/api/posts/:id` | Owner only; 204; cascades comments |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  Error,
  policy::{self, Action},
  post::{NewPost, Post, PostPatch},
  store::{ContentStore, Page},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl From<PageParams> for Page {
  fn from(p: PageParams) -> Self {
    Page { limit: p.limit, offset: p.offset }
  }
}

/// `GET /api/posts[?limit=...][&offset=...]`
///
/// Identity is still resolved even though reads are public — credentials
/// that are present but invalid are rejected, not silently ignored.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let posts = state
    .store
    .list_posts(params.into())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(posts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/posts`. The author and timestamp are
/// server-assigned; they have no field here for a client to supply.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text:  String,
  pub group: Option<Uuid>,
  pub image: Option<String>,
}

/// `POST /api/posts` — returns 201 + the stored post.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;
  let author = principal.require_user()?.clone();

  let post = state
    .store
    .create_post(NewPost {
      author,
      text: body.text,
      group: body.group,
      image: body.image,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/posts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
  Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let post = state
    .store
    .get_post(post_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(Error::PostNotFound(post_id))?;
  Ok(Json(post))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct PatchBody {
  pub text:  Option<String>,
  pub group: Option<Uuid>,
  pub image: Option<String>,
}

/// `PUT`/`PATCH /api/posts/:id` — owner only; absent fields are unchanged.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path(post_id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Post>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  // Collection gate first: anonymous writers are rejected before any
  // object state is read.
  policy::authorize(&principal, Action::Write, None)?;

  let post = state
    .store
    .get_post(post_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(Error::PostNotFound(post_id))?;
  policy::authorize(&principal, Action::Write, Some(&post))?;

  let updated = state
    .store
    .update_post(post_id, PostPatch {
      text:  body.text,
      group: body.group,
      image: body.image,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/posts/:id` — owner only; 204 on success.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path(post_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;

  let post = state
    .store
    .get_post(post_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(Error::PostNotFound(post_id))?;
  policy::authorize(&principal, Action::Write, Some(&post))?;

  state
    .store
    .delete_post(post_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
