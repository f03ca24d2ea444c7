//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::path::Path;

use chrono::Utc;
use quill_core::{
  comment::{Comment, NewComment},
  follow::{EdgeCandidate, FollowEdge},
  group::{Group, NewGroup},
  post::{NewPost, Post, PostPatch},
  principal::{NewUser, UserAccount, UserRef},
  store::{ContentStore, FollowQuery, Page},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawComment, RawFollow, RawGroup, RawPost, decode_uuid,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Constraint mapping ──────────────────────────────────────────────────────

/// Map a follow-edge constraint violation back into the domain taxonomy.
///
/// The schema's UNIQUE and CHECK constraints are the durable enforcement of
/// edge integrity; a write that loses the race past the in-process fast-path
/// check lands here instead of surfacing as a backend fault.
fn map_edge_constraint(err: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) =
    &err
  {
    match e.extended_code {
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
        return Error::Core(quill_core::Error::DuplicateFollow);
      }
      rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => {
        return Error::Core(quill_core::Error::SelfFollow);
      }
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
        return Error::Core(quill_core::Error::Validation(
          "unknown user reference".to_string(),
        ));
      }
      _ => {}
    }
  }
  Error::Database(err)
}

/// Map a uniqueness violation to a validation rejection with `msg`.
fn map_unique(err: tokio_rusqlite::Error, msg: &str) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) =
    &err
    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  {
    return Error::Core(quill_core::Error::Validation(msg.to_string()));
  }
  Error::Database(err)
}

/// Map a foreign-key violation to a validation rejection naming `what`.
fn map_fk(err: tokio_rusqlite::Error, what: &str) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) =
    &err
    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  {
    return Error::Core(quill_core::Error::Validation(format!(
      "unknown {what} reference"
    )));
  }
  Error::Database(err)
}

// ─── Row readers ─────────────────────────────────────────────────────────────

const POST_COLUMNS: &str = "p.post_id, p.text, p.created_at, p.author_id, \
                            u.username, p.group_id, p.image";

fn post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    post_id:         row.get(0)?,
    text:            row.get(1)?,
    created_at:      row.get(2)?,
    author_id:       row.get(3)?,
    author_username: row.get(4)?,
    group_id:        row.get(5)?,
    image:           row.get(6)?,
  })
}

const COMMENT_COLUMNS: &str = "c.comment_id, c.text, c.created_at, \
                               c.author_id, u.username, c.post_id";

fn comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id:      row.get(0)?,
    text:            row.get(1)?,
    created_at:      row.get(2)?,
    author_id:       row.get(3)?,
    author_username: row.get(4)?,
    post_id:         row.get(5)?,
  })
}

const FOLLOW_COLUMNS: &str = "f.follow_id, f.user_id, u1.username, \
                              f.following_id, u2.username";

fn follow_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFollow> {
  Ok(RawFollow {
    follow_id:          row.get(0)?,
    user_id:            row.get(1)?,
    user_username:      row.get(2)?,
    following_id:       row.get(3)?,
    following_username: row.get(4)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A quill content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All SQL
/// runs serially on the connection's thread, so each statement commits
/// atomically and cascades run inside SQLite's implicit transaction for the
/// triggering DELETE.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<UserAccount> {
    let account = UserAccount {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(account.user_id);
    let username = account.username.clone();
    let hash     = account.password_hash.clone();
    let at_str   = encode_dt(account.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, username, hash, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_unique(e, "username already taken"))?;

    Ok(account)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<UserRef>> {
    let id_str = encode_uuid(id);

    let raw: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(id_str, username)| {
        Ok(UserRef { user_id: decode_uuid(&id_str)?, username })
      })
      .transpose()
  }

  async fn get_account(&self, username: &str) -> Result<Option<UserAccount>> {
    let username = username.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash, created_at
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawAccount {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::UserNotFound(id.to_string())));
    }
    Ok(())
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, input: NewGroup) -> Result<Group> {
    let group = Group {
      group_id:    Uuid::new_v4(),
      title:       input.title,
      slug:        input.slug,
      description: input.description,
    };

    let id_str      = encode_uuid(group.group_id);
    let title       = group.title.clone();
    let slug        = group.slug.clone();
    let description = group.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO groups (group_id, title, slug, description)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, title, slug, description],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_unique(e, "slug already taken"))?;

    Ok(group)
  }

  async fn get_group(&self, id: Uuid) -> Result<Option<Group>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT group_id, title, slug, description
               FROM groups WHERE group_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGroup {
                  group_id:    row.get(0)?,
                  title:       row.get(1)?,
                  slug:        row.get(2)?,
                  description: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    let raws: Vec<RawGroup> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT group_id, title, slug, description
           FROM groups ORDER BY title, rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawGroup {
              group_id:    row.get(0)?,
              title:       row.get(1)?,
              slug:        row.get(2)?,
              description: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn delete_group(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM groups WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::GroupNotFound(id)));
    }
    Ok(())
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      post_id:    Uuid::new_v4(),
      text:       input.text,
      created_at: Utc::now(),
      author:     input.author,
      group:      input.group,
      image:      input.image,
    };

    let id_str     = encode_uuid(post.post_id);
    let text       = post.text.clone();
    let at_str     = encode_dt(post.created_at);
    let author_str = encode_uuid(post.author.user_id);
    let group_str  = post.group.map(encode_uuid);
    let image      = post.image.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, text, created_at, author_id, group_id, image)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, text, at_str, author_str, group_str, image],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_fk(e, "group"))?;

    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {POST_COLUMNS}
                 FROM posts p JOIN users u ON u.user_id = p.author_id
                 WHERE p.post_id = ?1"
              ),
              rusqlite::params![id_str],
              post_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, page: Page) -> Result<Vec<Post>> {
    // rowid breaks created_at ties so repeated pagination stays
    // deterministic at SQLite's timestamp resolution.
    let limit_val  = page.effective_limit() as i64;
    let offset_val = page.effective_offset() as i64;

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS}
           FROM posts p JOIN users u ON u.user_id = p.author_id
           ORDER BY p.created_at DESC, p.rowid DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], post_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post> {
    let id_str    = encode_uuid(id);
    let text      = patch.text;
    let group_str = patch.group.map(encode_uuid);
    let image     = patch.image;

    // author_id and created_at are deliberately absent from the UPDATE.
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE posts SET
             text     = COALESCE(?2, text),
             group_id = COALESCE(?3, group_id),
             image    = COALESCE(?4, image)
           WHERE post_id = ?1",
          rusqlite::params![id_str, text, group_str, image],
        )?)
      })
      .await
      .map_err(|e| map_fk(e, "group"))?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::PostNotFound(id)));
    }

    self
      .get_post(id)
      .await?
      .ok_or(Error::Core(quill_core::Error::PostNotFound(id)))
  }

  async fn delete_post(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM posts WHERE post_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::PostNotFound(id)));
    }
    Ok(())
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      text:       input.text,
      created_at: Utc::now(),
      author:     input.author,
      post:       input.post,
    };

    let id_str     = encode_uuid(comment.comment_id);
    let text       = comment.text.clone();
    let at_str     = encode_dt(comment.created_at);
    let author_str = encode_uuid(comment.author.user_id);
    let post_str   = encode_uuid(comment.post);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, text, created_at, author_id, post_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, text, at_str, author_str, post_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_fk(e, "post"))?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMMENT_COLUMNS}
                 FROM comments c JOIN users u ON u.user_id = c.author_id
                 WHERE c.comment_id = ?1"
              ),
              rusqlite::params![id_str],
              comment_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
    let post_str = encode_uuid(post_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS}
           FROM comments c JOIN users u ON u.user_id = c.author_id
           WHERE c.post_id = ?1
           ORDER BY c.created_at DESC, c.rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_str], comment_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn update_comment(&self, id: Uuid, text: String) -> Result<Comment> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE comments SET text = ?2 WHERE comment_id = ?1",
          rusqlite::params![id_str, text],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::CommentNotFound(id)));
    }

    self
      .get_comment(id)
      .await?
      .ok_or(Error::Core(quill_core::Error::CommentNotFound(id)))
  }

  async fn delete_comment(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::CommentNotFound(id)));
    }
    Ok(())
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn create_follow(&self, candidate: EdgeCandidate) -> Result<FollowEdge> {
    let follow_id = Uuid::new_v4();

    let id_str   = encode_uuid(follow_id);
    let user_str = encode_uuid(candidate.user);
    let fol_str  = encode_uuid(candidate.following);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (follow_id, user_id, following_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, user_str, fol_str],
        )?;
        Ok(())
      })
      .await
      .map_err(map_edge_constraint)?;

    self
      .get_follow(follow_id)
      .await?
      .ok_or(Error::Core(quill_core::Error::FollowNotFound(follow_id)))
  }

  async fn follow_exists(&self, candidate: EdgeCandidate) -> Result<bool> {
    let user_str = encode_uuid(candidate.user);
    let fol_str  = encode_uuid(candidate.following);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM follows WHERE user_id = ?1 AND following_id = ?2",
              rusqlite::params![user_str, fol_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn get_follow(&self, id: Uuid) -> Result<Option<FollowEdge>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFollow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FOLLOW_COLUMNS}
                 FROM follows f
                 JOIN users u1 ON u1.user_id = f.user_id
                 JOIN users u2 ON u2.user_id = f.following_id
                 WHERE f.follow_id = ?1"
              ),
              rusqlite::params![id_str],
              follow_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFollow::into_edge).transpose()
  }

  async fn list_follows(
    &self,
    user: Uuid,
    query: &FollowQuery,
  ) -> Result<Vec<FollowEdge>> {
    let user_str   = encode_uuid(user);
    let search     = query.search.clone();
    let limit_val  = query.page.effective_limit() as i64;
    let offset_val = query.page.effective_offset() as i64;

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        // The row scope always restricts to the requesting user's outgoing
        // edges; the username filter only ever applies on top of it.
        let mut sql = format!(
          "SELECT {FOLLOW_COLUMNS}
           FROM follows f
           JOIN users u1 ON u1.user_id = f.user_id
           JOIN users u2 ON u2.user_id = f.following_id
           WHERE f.user_id = ?1"
        );
        if search.is_some() {
          sql.push_str(" AND instr(lower(u2.username), lower(?2)) > 0");
        }
        sql.push_str(" ORDER BY f.rowid LIMIT ?3 OFFSET ?4");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              user_str,
              search.as_deref(),
              limit_val,
              offset_val,
            ],
            follow_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_edge).collect()
  }

  async fn delete_follow(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE follow_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(quill_core::Error::FollowNotFound(id)));
    }
    Ok(())
  }
}
