//! SQLite backend for the quill content store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The schema carries the durable
//! relationship invariants: follow-edge ordered-pair uniqueness, the
//! anti-self-follow check, and the cascade / set-null foreign-key actions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
