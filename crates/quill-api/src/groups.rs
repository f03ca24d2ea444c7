//! Read-only handlers for `/api/groups` endpoints.
//!
//! Groups have no owner and no write surface here; they are created and
//! deleted by administrative tooling straight against the store.

use axum::{
  Json,
  extract::{Path, State},
};
use quill_core::{Error, group::Group, store::ContentStore};
use uuid::Uuid;

use crate::{AppState, auth::Identity, error::ApiError};

/// `GET /api/groups`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
) -> Result<Json<Vec<Group>>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let groups = state
    .store
    .list_groups()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(groups))
}

/// `GET /api/groups/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Identity(_principal): Identity,
  Path(group_id): Path<Uuid>,
) -> Result<Json<Group>, ApiError>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  let group = state
    .store
    .get_group(group_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(Error::GroupNotFound(group_id))?;
  Ok(Json(group))
}
