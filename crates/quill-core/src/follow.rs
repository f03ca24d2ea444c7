//! FollowEdge — a directed edge in the social graph, and the integrity
//! checks guarding its creation.

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, policy::Owned, principal::UserRef};

/// A stored follow edge. Directional: `(A, B)` and `(B, A)` are distinct
/// edges. Edges are created and deleted, never updated.
#[derive(Debug, Clone, Serialize)]
pub struct FollowEdge {
  pub follow_id: Uuid,
  /// The follower; always the principal that created the edge.
  pub user:      UserRef,
  pub following: UserRef,
}

impl Owned for FollowEdge {
  fn owner_id(&self) -> Uuid { self.user.user_id }
}

/// A candidate edge about to be written. `user` is taken from the
/// authenticated principal, never from client input, so an edge cannot be
/// forged on another principal's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCandidate {
  pub user:      Uuid,
  pub following: Uuid,
}

/// Relationship Integrity Validator — the fast-path structural checks run
/// before an edge write.
///
/// This produces the friendly rejection; the storage layer's UNIQUE and
/// CHECK constraints remain the source of truth under concurrent writes.
/// A candidate that is both self-referential and already stored reports
/// [`Error::SelfFollow`].
pub fn validate_edge(
  candidate: &EdgeCandidate,
  already_exists: bool,
) -> Result<()> {
  if candidate.user == candidate.following {
    return Err(Error::SelfFollow);
  }
  if already_exists {
    return Err(Error::DuplicateFollow);
  }
  Ok(())
}
