//! SQL schema for the quill SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! The relationship invariants live here as durable constraints:
//! `UNIQUE (user_id, following_id)` and `CHECK (user_id <> following_id)` on
//! `follows` back the in-process fast-path checks, and the foreign-key
//! actions implement cascade / set-null deletion.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,    -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS groups (
    group_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL
);

-- A deleted group leaves its posts behind with group_id nulled out.
CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL,    -- ISO 8601 UTC; server-assigned
    author_id  TEXT NOT NULL REFERENCES users(user_id)   ON DELETE CASCADE,
    group_id   TEXT          REFERENCES groups(group_id) ON DELETE SET NULL,
    image      TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL,    -- ISO 8601 UTC; server-assigned
    author_id  TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    post_id    TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE
);

-- Directed follow edges. (A,B) and (B,A) are distinct rows.
CREATE TABLE IF NOT EXISTS follows (
    follow_id    TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    following_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    UNIQUE (user_id, following_id),
    CHECK  (user_id <> following_id)
);

CREATE INDEX IF NOT EXISTS posts_created_idx ON posts(created_at);
CREATE INDEX IF NOT EXISTS comments_post_idx ON comments(post_id, created_at);
CREATE INDEX IF NOT EXISTS follows_user_idx  ON follows(user_id);

PRAGMA user_version = 1;
";
