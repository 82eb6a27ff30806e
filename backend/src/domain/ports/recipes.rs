//! Driving ports for recipe use-cases.
//!
//! Every method returns the [`RecipeRepresentation`] selected by its
//! [`crate::domain::RecipeOperation`].

use async_trait::async_trait;

use crate::domain::{Error, RecipeDraft, RecipeId, RecipePatch, RecipeRepresentation, UserId};

/// Uploaded image as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read side of the recipe collection.
#[async_trait]
pub trait RecipesQuery: Send + Sync {
    /// The caller's recipes as summaries.
    async fn list(&self, caller: &UserId) -> Result<Vec<RecipeRepresentation>, Error>;

    /// One of the caller's recipes in detail.
    async fn retrieve(&self, caller: &UserId, id: &RecipeId)
    -> Result<RecipeRepresentation, Error>;
}

/// Write side of the recipe collection.
#[async_trait]
pub trait RecipesCommand: Send + Sync {
    async fn create(&self, caller: &UserId, draft: RecipeDraft)
    -> Result<RecipeRepresentation, Error>;

    /// Replace every editable field.
    async fn update(
        &self,
        caller: &UserId,
        id: &RecipeId,
        draft: RecipeDraft,
    ) -> Result<RecipeRepresentation, Error>;

    /// Change only the supplied fields.
    async fn partial_update(
        &self,
        caller: &UserId,
        id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeRepresentation, Error>;

    async fn delete(&self, caller: &UserId, id: &RecipeId) -> Result<(), Error>;

    /// Validate, store and attach an image.
    async fn upload_image(
        &self,
        caller: &UserId,
        id: &RecipeId,
        upload: ImageUpload,
    ) -> Result<RecipeRepresentation, Error>;
}
