//! Post — a user's publication.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{policy::Owned, principal::UserRef};

/// A publication. `author` and `created_at` are assigned by the server at
/// creation and never change afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
  pub author:     UserRef,
  /// Group the post is tagged to. Survives group deletion as `None`.
  pub group:      Option<Uuid>,
  /// Reference to an attached image blob, if any.
  pub image:      Option<String>,
}

impl Owned for Post {
  fn owner_id(&self) -> Uuid { self.author.user_id }
}

/// Input to [`crate::store::ContentStore::create_post`].
/// `author` comes from the request's principal, never from the body;
/// the id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author: UserRef,
  pub text:   String,
  pub group:  Option<Uuid>,
  pub image:  Option<String>,
}

/// Partial update; `None` fields are left unchanged. There is deliberately
/// no way to express an author or timestamp change.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
  pub text:  Option<String>,
  pub group: Option<Uuid>,
  pub image: Option<String>,
}
