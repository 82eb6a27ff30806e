//! Port for tag and ingredient persistence.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Attribute, AttributeFilter, AttributeId, AttributeKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attribute repository adapters.
    pub enum AttributeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "attribute repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "attribute repository query failed: {message}",
    }
}

/// Storage for user-owned tags and ingredients.
///
/// Listings are always scoped to one owner and ordered by name descending,
/// then id descending. With [`AttributeFilter::assigned_only`] set, only
/// attributes linked to at least one recipe are returned, each once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// Persist a new attribute.
    async fn insert(&self, attribute: &Attribute) -> Result<(), AttributeRepositoryError>;

    /// List the owner's attributes of `kind`.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError>;

    /// Fetch attributes of `kind` by id, regardless of owner. Unknown ids
    /// are skipped.
    async fn find_by_ids(
        &self,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError>;
}
