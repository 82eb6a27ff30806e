//! Tag and ingredient domain service.
//!
//! One service handles both collections; the [`AttributeKind`] argument
//! selects which one an operation targets.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    AttributeRepository, AttributeRepositoryError, RecipeAttributesCommand, RecipeAttributesQuery,
};
use crate::domain::{
    Attribute, AttributeFilter, AttributeId, AttributeKind, AttributeName, Error, UserId,
};

/// Attribute service implementing the attribute driving ports.
#[derive(Clone)]
pub struct RecipeAttributeService<A> {
    attributes: Arc<A>,
}

impl<A> RecipeAttributeService<A> {
    /// Create a new service with the given repository.
    pub fn new(attributes: Arc<A>) -> Self {
        Self { attributes }
    }
}

/// Translate an attribute repository failure into a domain error.
///
/// Shared by every service that reads tags or ingredients.
pub(crate) fn map_attribute_error(error: AttributeRepositoryError) -> Error {
    match error {
        AttributeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attribute repository unavailable: {message}"))
        }
        AttributeRepositoryError::Query { message } => {
            Error::internal(format!("attribute repository error: {message}"))
        }
    }
}

#[async_trait]
impl<A> RecipeAttributesQuery for RecipeAttributeService<A>
where
    A: AttributeRepository,
{
    async fn list(
        &self,
        caller: &UserId,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, Error> {
        self.attributes
            .list_for_owner(caller, kind, filter)
            .await
            .map_err(map_attribute_error)
    }
}

#[async_trait]
impl<A> RecipeAttributesCommand for RecipeAttributeService<A>
where
    A: AttributeRepository,
{
    async fn create(
        &self,
        caller: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, Error> {
        let attribute = Attribute::new(AttributeId::random(), kind, name, *caller);
        self.attributes
            .insert(&attribute)
            .await
            .map_err(map_attribute_error)?;
        debug!(%kind, id = %attribute.id(), owner = %caller, "attribute created");
        Ok(attribute)
    }
}
