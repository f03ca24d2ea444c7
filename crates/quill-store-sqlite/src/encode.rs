//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use quill_core::{
  comment::Comment,
  follow::FollowEdge,
  group::Group,
  post::Post,
  principal::{UserAccount, UserRef},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawAccount {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn into_account(self) -> Result<UserAccount> {
    Ok(UserAccount {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `groups` row.
pub struct RawGroup {
  pub group_id:    String,
  pub title:       String,
  pub slug:        String,
  pub description: String,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      group_id:    decode_uuid(&self.group_id)?,
      title:       self.title,
      slug:        self.slug,
      description: self.description,
    })
  }
}

/// Raw strings read from a `posts` row joined with its author.
pub struct RawPost {
  pub post_id:         String,
  pub text:            String,
  pub created_at:      String,
  pub author_id:       String,
  pub author_username: String,
  pub group_id:        Option<String>,
  pub image:           Option<String>,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:    decode_uuid(&self.post_id)?,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
      author:     UserRef {
        user_id:  decode_uuid(&self.author_id)?,
        username: self.author_username,
      },
      group:      self.group_id.as_deref().map(decode_uuid).transpose()?,
      image:      self.image,
    })
  }
}

/// Raw strings read from a `comments` row joined with its author.
pub struct RawComment {
  pub comment_id:      String,
  pub text:            String,
  pub created_at:      String,
  pub author_id:       String,
  pub author_username: String,
  pub post_id:         String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
      author:     UserRef {
        user_id:  decode_uuid(&self.author_id)?,
        username: self.author_username,
      },
      post:       decode_uuid(&self.post_id)?,
    })
  }
}

/// Raw strings read from a `follows` row joined with both endpoints.
pub struct RawFollow {
  pub follow_id:          String,
  pub user_id:            String,
  pub user_username:      String,
  pub following_id:       String,
  pub following_username: String,
}

impl RawFollow {
  pub fn into_edge(self) -> Result<FollowEdge> {
    Ok(FollowEdge {
      follow_id: decode_uuid(&self.follow_id)?,
      user:      UserRef {
        user_id:  decode_uuid(&self.user_id)?,
        username: self.user_username,
      },
      following: UserRef {
        user_id:  decode_uuid(&self.following_id)?,
        username: self.following_username,
      },
    })
  }
}
