//! Owner scoping for user-owned resources.
//!
//! A resource owned by someone else is reported exactly like a missing one,
//! so callers cannot probe for other users' identifiers.

use super::attribute::Attribute;
use super::recipe::Recipe;
use super::user::UserId;

/// Resources that belong to exactly one user.
pub trait Owned {
    fn owner(&self) -> UserId;
}

impl Owned for Attribute {
    fn owner(&self) -> UserId {
        Attribute::owner(self)
    }
}

impl Owned for Recipe {
    fn owner(&self) -> UserId {
        Recipe::owner(self)
    }
}

/// Keep `resource` only when `caller` owns it.
///
/// # Examples
/// ```
/// use recipe_backend::domain::UserId;
/// use recipe_backend::domain::ownership::{Owned, owned_by};
///
/// struct Note(UserId);
/// impl Owned for Note {
///     fn owner(&self) -> UserId {
///         self.0
///     }
/// }
///
/// let me = UserId::random();
/// assert!(owned_by(Some(Note(me)), me).is_some());
/// assert!(owned_by(Some(Note(UserId::random())), me).is_none());
/// ```
pub fn owned_by<T: Owned>(resource: Option<T>, caller: UserId) -> Option<T> {
    resource.filter(|item| item.owner() == caller)
}
