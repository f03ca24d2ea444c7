//! Comment — a reply scoped to exactly one post.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{policy::Owned, principal::UserRef};

/// A comment. Always belongs to one post; deleted with it. `author` and
/// `created_at` are assigned by the server at creation and never change.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
  pub author:     UserRef,
  pub post:       Uuid,
}

impl Owned for Comment {
  fn owner_id(&self) -> Uuid { self.author.user_id }
}

/// Input to [`crate::store::ContentStore::create_comment`].
/// `author` comes from the request's principal and `post` from the
/// resolved parent scope — neither is ever client-supplied.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub author: UserRef,
  pub post:   Uuid,
  pub text:   String,
}
