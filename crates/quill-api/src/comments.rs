//! Handlers for comments nested under `/api/posts/:post_id/comments`.
//!
//! The parent post is resolved afresh on every request before anything else
//! touches the comment collection: a missing parent is a 404, never an
//! empty listing, and a created comment takes its parent from the resolved
//! path scope rather than from anything in the body.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  Error,
  comment::{Comment, NewComment},
  policy::{self, Action},
  post::Post,
  scope::{ParentHandle, resolve_scope},
  store::ContentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

// ─── Scope binding ────────────────────────────────────────────────────────────

/// The single instantiation of the generic parent scope: posts as parents
/// of comments.
async fn resolve_post<S>(
  store: &S,
  post_id: Uuid,
) -> Result<ParentHandle<Post>, ApiError>
where
  S: ContentStore,
{
  let lookup = store.get_post(post_id).await.map_err(ApiError::from_store)?;
  Ok(resolve_scope(post_id, lookup, Error::PostNotFound)?)
}

/// Load a comment and check it belongs to the resolved parent. A comment
/// reached through the wrong parent path is simply not found.
async fn fetch_scoped<S>(
  store: &S,
  parent: &ParentHandle<Post>,
  comment_id: Uuid,
) -> Result<Comment, ApiError>
where
  S: ContentStore,
{
  let comment = store
    .get_comment(comment_id)
    .await
    .map_err(ApiError::from_store)?
    .filter(|c| c.post == parent.id())
    .ok_or(Error::CommentNotFound(comment_id))?;
  Ok(comment)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/posts/:post_id/comments` — newest first within the parent.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
  Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let parent = resolve_post(state.store.as_ref(), post_id).await?;
  let comments = state
    .store
    .list_comments(parent.id())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(comments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text: String,
}

/// `POST /api/posts/:post_id/comments` — returns 201 + the stored comment.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path(post_id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;
  let author = principal.require_user()?.clone();
  let parent = resolve_post(state.store.as_ref(), post_id).await?;

  let comment = state
    .store
    .create_comment(NewComment {
      author,
      post: parent.id(),
      text: body.text,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/posts/:post_id/comments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
  Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Comment>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let parent = resolve_post(state.store.as_ref(), post_id).await?;
  let comment = fetch_scoped(state.store.as_ref(), &parent, comment_id).await?;
  Ok(Json(comment))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PatchBody {
  pub text: Option<String>,
}

/// `PUT`/`PATCH /api/posts/:post_id/comments/:id` — owner only; text only.
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Comment>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;
  let parent = resolve_post(state.store.as_ref(), post_id).await?;
  let comment = fetch_scoped(state.store.as_ref(), &parent, comment_id).await?;
  policy::authorize(&principal, Action::Write, Some(&comment))?;

  let updated = match body.text {
    Some(text) => state
      .store
      .update_comment(comment_id, text)
      .await
      .map_err(ApiError::from_store)?,
    None => comment,
  };
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/posts/:post_id/comments/:id` — owner only; 204 on success.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Identity(principal): Identity,
  Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  policy::authorize(&principal, Action::Write, None)?;
  let parent = resolve_post(state.store.as_ref(), post_id).await?;
  let comment = fetch_scoped(state.store.as_ref(), &parent, comment_id).await?;
  policy::authorize(&principal, Action::Write, Some(&comment))?;

  state
    .store
    .delete_comment(comment.comment_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
