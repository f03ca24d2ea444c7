//! Resource Scoping Resolver.
//!
//! Translates a path-embedded parent identifier into a validated handle
//! that binds child reads and writes to that parent. Generic over the
//! parent type; resolved afresh on every request, never cached, so a
//! deleted parent fails loudly instead of yielding a stale scope.

use uuid::Uuid;

use crate::{Error, Result};

/// A validated handle on a parent resource.
///
/// Child list queries filter on [`ParentHandle::id`], and child creates
/// take their parent reference from it — a client-supplied parent
/// reference never reaches a write.
#[derive(Debug)]
pub struct ParentHandle<P> {
  id:     Uuid,
  parent: P,
}

impl<P> ParentHandle<P> {
  /// The identifier all child operations are constrained to.
  pub fn id(&self) -> Uuid { self.id }

  pub fn parent(&self) -> &P { &self.parent }
}

/// Resolve a parent lookup result into a handle.
///
/// An absent parent is a hard failure built by `missing`, never an empty
/// scope: listing children of a deleted parent must not masquerade as an
/// empty collection. (An existing parent with no children still lists as
/// empty — the distinction is parent existence, not child count.)
pub fn resolve_scope<P>(
  parent_id: Uuid,
  lookup: Option<P>,
  missing: fn(Uuid) -> Error,
) -> Result<ParentHandle<P>> {
  match lookup {
    Some(parent) => Ok(ParentHandle { id: parent_id, parent }),
    None => Err(missing(parent_id)),
  }
}
