//! JSON REST API for quill.
//!
//! Exposes an axum [`Router`] backed by any
//! [`quill_core::store::ContentStore`]. Every request flows through the same
//! pipeline: the identity extractor resolves a [`Principal`]
//! (`auth`), the policy gate decides whether the action is allowed
//! (`quill_core::policy`), nested resources resolve their parent scope
//! (`quill_core::scope`), and edge writes run the integrity fast path
//! (`quill_core::follow`) before the store commits.
//!
//! [`Principal`]: quill_core::principal::Principal

pub mod auth;
pub mod comments;
pub mod error;
pub mod follow;
pub mod groups;
pub mod posts;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get},
};
use quill_core::store::ContentStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContentStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the content API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Posts
    .route("/api/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route(
      "/api/posts/{post_id}",
      get(posts::get_one::<S>)
        .put(posts::update_one::<S>)
        .patch(posts::update_one::<S>)
        .delete(posts::delete_one::<S>),
    )
    // Comments, scoped under their parent post
    .route(
      "/api/posts/{post_id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/api/posts/{post_id}/comments/{comment_id}",
      get(comments::get_one::<S>)
        .put(comments::update_one::<S>)
        .patch(comments::update_one::<S>)
        .delete(comments::delete_one::<S>),
    )
    // Groups (read-only)
    .route("/api/groups", get(groups::list::<S>))
    .route("/api/groups/{group_id}", get(groups::get_one::<S>))
    // Follow edges
    .route("/api/follow", get(follow::list::<S>).post(follow::create::<S>))
    .route("/api/follow/{follow_id}", delete(follow::delete_one::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
