//! Driving ports for tag and ingredient use-cases.

use async_trait::async_trait;

use crate::domain::{Attribute, AttributeFilter, AttributeKind, AttributeName, Error, UserId};

/// Read side of the attribute collections.
#[async_trait]
pub trait RecipeAttributesQuery: Send + Sync {
    /// List the caller's attributes of `kind`.
    async fn list(
        &self,
        caller: &UserId,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, Error>;
}

/// Write side of the attribute collections.
#[async_trait]
pub trait RecipeAttributesCommand: Send + Sync {
    /// Create an attribute owned by the caller.
    async fn create(
        &self,
        caller: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, Error>;
}
