//! Group — a community a post can be tagged to.

use serde::Serialize;
use uuid::Uuid;

/// A community. Groups have no owner; they are managed by administrative
/// flows and the API only ever reads them.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
  pub group_id:    Uuid,
  pub title:       String,
  /// URL-friendly unique identifier.
  pub slug:        String,
  pub description: String,
}

/// Input to [`crate::store::ContentStore::add_group`].
#[derive(Debug, Clone)]
pub struct NewGroup {
  pub title:       String,
  pub slug:        String,
  pub description: String,
}
