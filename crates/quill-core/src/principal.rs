//! Principal — the acting identity of a request.
//!
//! Resolved once at the request boundary and passed explicitly into every
//! decision function. Identity is a value, not ambient state; nothing in
//! this crate reaches for a "current user".

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::{Error, Result};

/// A reference to a stored user, as it appears on owned resources.
///
/// Serialises as the bare username — ids are an internal addressing
/// concern, usernames are the wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
  pub user_id:  Uuid,
  pub username: String,
}

impl Serialize for UserRef {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.username)
  }
}

/// The acting identity: an authenticated user or the anonymous placeholder.
/// Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
  Anonymous,
  User(UserRef),
}

impl Principal {
  pub fn is_authenticated(&self) -> bool { matches!(self, Self::User(_)) }

  /// The acting user's id, if authenticated.
  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Self::Anonymous => None,
      Self::User(u) => Some(u.user_id),
    }
  }

  pub fn user(&self) -> Option<&UserRef> {
    match self {
      Self::Anonymous => None,
      Self::User(u) => Some(u),
    }
  }

  /// The acting user, or [`Error::Unauthenticated`].
  pub fn require_user(&self) -> Result<&UserRef> {
    self.user().ok_or(Error::Unauthenticated)
  }
}

/// The stored identity record behind a principal. Only the identity layer
/// and administrative tooling ever see the password hash.
#[derive(Debug, Clone)]
pub struct UserAccount {
  pub user_id:       Uuid,
  pub username:      String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl UserAccount {
  pub fn user_ref(&self) -> UserRef {
    UserRef {
      user_id:  self.user_id,
      username: self.username.clone(),
    }
  }
}

/// Input to [`crate::store::ContentStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}
