//! Error types for `quill-core`.
//!
//! Every rejection a request can run into is a distinct variant; layers
//! above map them to transport statuses without collapsing the taxonomy.
//! `Unauthenticated` and `NotOwner` stay separate because clients react
//! differently (re-authenticate vs. never retry).

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A write was attempted with no authenticated principal.
  #[error("authentication required")]
  Unauthenticated,

  /// The authenticated principal does not own the target resource.
  #[error("principal is not the owner of this resource")]
  NotOwner,

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("group not found: {0}")]
  GroupNotFound(Uuid),

  #[error("follow edge not found: {0}")]
  FollowNotFound(Uuid),

  #[error("no such user: {0}")]
  UserNotFound(String),

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("already following this user")]
  DuplicateFollow,

  /// Malformed input at the serialization boundary.
  #[error("validation failed: {0}")]
  Validation(String),

  /// A backend fault with no client-facing meaning.
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
