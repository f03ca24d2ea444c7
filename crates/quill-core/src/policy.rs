//! Authorization Policy Evaluator.
//!
//! One decision function applied to every mutating or object-scoped
//! request, independent of resource type. Read access is public; write
//! access is owner-exclusive.

use uuid::Uuid;

use crate::{Error, Result, principal::Principal};

/// What a request wants to do. `Write` covers create, update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Read,
  Write,
}

/// Per-resource owner accessor: each owned resource type names the one
/// field that decides write access.
pub trait Owned {
  fn owner_id(&self) -> Uuid;
}

/// Decide whether `principal` may perform `action`, optionally against a
/// loaded `target`.
///
/// Handlers call this twice for object mutations: once with `target = None`
/// before anything is loaded or constructed (the collection gate — this is
/// what rejects unauthenticated creation before an object exists), and
/// again with the loaded object (the object gate). The function is pure;
/// a rejection is terminal and implies nothing was mutated.
pub fn authorize(
  principal: &Principal,
  action: Action,
  target: Option<&dyn Owned>,
) -> Result<()> {
  if action == Action::Read {
    return Ok(());
  }

  let Some(user_id) = principal.user_id() else {
    return Err(Error::Unauthenticated);
  };

  match target {
    None => Ok(()),
    Some(t) if t.owner_id() == user_id => Ok(()),
    Some(_) => Err(Error::NotOwner),
  }
}
