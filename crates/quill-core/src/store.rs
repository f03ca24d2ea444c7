//! The `ContentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `quill-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  comment::{Comment, NewComment},
  follow::{EdgeCandidate, FollowEdge},
  group::{Group, NewGroup},
  post::{NewPost, Post, PostPatch},
  principal::{NewUser, UserAccount, UserRef},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Hard ceiling on `limit` for paginated list queries. Requests asking for
/// more are clamped, never honoured.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Page-based truncation for list queries. Ordering is fixed per query, so
/// identical parameters against an unchanged dataset return identical rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl Page {
  /// The effective row cap: the requested limit clamped to
  /// [`MAX_PAGE_LIMIT`].
  pub fn effective_limit(&self) -> usize {
    self.limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
  }

  pub fn effective_offset(&self) -> usize { self.offset.unwrap_or(0) }
}

/// Parameters for [`ContentStore::list_follows`].
#[derive(Debug, Clone, Default)]
pub struct FollowQuery {
  /// Case-insensitive substring filter over the followed user's username.
  /// Applied after the row scope restricts to the requesting principal's
  /// outgoing edges.
  pub search: Option<String>,
  pub page:   Page,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a quill storage backend.
///
/// The backend owns every durable invariant: id and timestamp assignment,
/// follow-edge ordered-pair uniqueness and the anti-self-reference check,
/// and the cascade / set-null behaviour of deletes. Each mutation commits
/// atomically — a failed request leaves no partial write visible.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The associated
/// error converts into [`crate::Error`] so the taxonomy survives the
/// backend boundary.
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user account. The username must be unique.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<UserAccount, Self::Error>> + Send + '_;

  /// Retrieve a user reference by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRef>, Self::Error>> + Send + '_;

  /// Retrieve the full account record (including the password hash) by
  /// username. Only the identity layer calls this.
  fn get_account<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + 'a;

  /// Delete a user. Cascades to their posts, comments and follow edges
  /// (both directions) in the same transaction.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Persist a new group. The slug must be unique.
  fn add_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  /// Delete a group. Dependent posts survive with their `group` reference
  /// set to null in the same transaction.
  fn delete_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. The id and `created_at` are set by the store.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// List posts, most recent first, truncated by `page`.
  fn list_posts(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Apply a partial update. `author` and `created_at` are not touched.
  fn update_post(
    &self,
    id: Uuid,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Delete a post. Cascades to its comments in the same transaction.
  fn delete_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a new comment. The id and `created_at` are set by the store.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// List a post's comments, most recent first.
  fn list_comments(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  fn update_comment(
    &self,
    id: Uuid,
    text: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Persist a follow edge. The schema's UNIQUE and CHECK constraints are
  /// the durable enforcement of edge integrity; a violation surfaces as
  /// the corresponding domain error, not as a backend fault.
  fn create_follow(
    &self,
    candidate: EdgeCandidate,
  ) -> impl Future<Output = Result<FollowEdge, Self::Error>> + Send + '_;

  /// Fast-path existence probe for the exact ordered pair.
  fn follow_exists(
    &self,
    candidate: EdgeCandidate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_follow(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  /// List `user`'s outgoing edges in insertion order, filtered and
  /// truncated by `query`.
  fn list_follows<'a>(
    &'a self,
    user: Uuid,
    query: &'a FollowQuery,
  ) -> impl Future<Output = Result<Vec<FollowEdge>, Self::Error>> + Send + 'a;

  fn delete_follow(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limit_clamped_to_ceiling() {
    let page = Page { limit: Some(10_000), offset: None };
    assert_eq!(page.effective_limit(), MAX_PAGE_LIMIT);
  }

  #[test]
  fn defaults_apply_when_absent() {
    let page = Page::default();
    assert_eq!(page.effective_limit(), MAX_PAGE_LIMIT);
    assert_eq!(page.effective_offset(), 0);
  }
}
