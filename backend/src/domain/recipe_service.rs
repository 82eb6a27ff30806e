//! Recipe domain service.
//!
//! Enforces owner scoping on every recipe operation, validates that linked
//! tags and ingredients belong to the caller, and stores uploaded images
//! under generated names.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::attribute_service::map_attribute_error;
use crate::domain::image_naming::{
    ImageIdGenerator, ImageNameError, extension_of, format_for_extension, name_for,
};
use crate::domain::ownership::owned_by;
use crate::domain::ports::{
    AttributeRepository, ImageStore, ImageStoreError, ImageUpload, RecipeRepository,
    RecipeRepositoryError, RecipesCommand, RecipesQuery,
};
use crate::domain::{
    Attribute, AttributeId, AttributeKind, Error, Recipe, RecipeDetail, RecipeDraft, RecipeId,
    RecipeOperation, RecipePatch, RecipeRepresentation, RecipeView, UserId,
};

/// Recipe service implementing the recipe driving ports.
#[derive(Clone)]
pub struct RecipeService<R, A, S, G> {
    recipes: Arc<R>,
    attributes: Arc<A>,
    images: Arc<S>,
    image_ids: Arc<G>,
}

impl<R, A, S, G> RecipeService<R, A, S, G> {
    /// Create a new service with the given adapters.
    pub fn new(recipes: Arc<R>, attributes: Arc<A>, images: Arc<S>, image_ids: Arc<G>) -> Self {
        Self {
            recipes,
            attributes,
            images,
            image_ids,
        }
    }
}

fn association_field(kind: AttributeKind) -> &'static str {
    match kind {
        AttributeKind::Tag => "tags",
        AttributeKind::Ingredient => "ingredients",
    }
}

fn image_field_error(code: &str, message: impl Into<String>) -> Error {
    Error::invalid_field("image", code, message)
}

impl<R, A, S, G> RecipeService<R, A, S, G>
where
    R: RecipeRepository,
    A: AttributeRepository,
    S: ImageStore,
    G: ImageIdGenerator,
{
    fn map_recipe_error(error: RecipeRepositoryError) -> Error {
        match error {
            RecipeRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("recipe repository unavailable: {message}"))
            }
            RecipeRepositoryError::Query { message } => {
                Error::internal(format!("recipe repository error: {message}"))
            }
        }
    }

    fn map_image_error(error: ImageStoreError) -> Error {
        match error {
            ImageStoreError::Unavailable { message } => {
                Error::service_unavailable(format!("image store unavailable: {message}"))
            }
            ImageStoreError::Write { message } => {
                Error::internal(format!("image store error: {message}"))
            }
        }
    }

    fn not_found() -> Error {
        Error::not_found("Not found.")
    }

    async fn owned_recipe(&self, caller: &UserId, id: &RecipeId) -> Result<Recipe, Error> {
        let found = self
            .recipes
            .find_by_id(id)
            .await
            .map_err(Self::map_recipe_error)?;
        owned_by(found, *caller).ok_or_else(Self::not_found)
    }

    async fn load_attributes(
        &self,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.attributes
            .find_by_ids(kind, ids)
            .await
            .map_err(map_attribute_error)
    }

    /// Reject ids that are unknown or belong to another user.
    async fn ensure_attributes_owned(
        &self,
        caller: &UserId,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<(), Error> {
        let found = self.load_attributes(kind, ids).await?;
        let owned: BTreeSet<AttributeId> = found
            .iter()
            .filter(|attribute| attribute.owner() == *caller)
            .map(Attribute::id)
            .collect();
        let missing: Vec<String> = ids.difference(&owned).map(ToString::to_string).collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(Error::invalid_request(format!(
            "unknown {} ids: {}",
            kind.label(),
            missing.join(", ")
        ))
        .with_details(json!({
            "field": association_field(kind),
            "code": "does_not_exist",
            "ids": missing,
        })))
    }

    async fn ensure_patch_references(
        &self,
        caller: &UserId,
        patch: &RecipePatch,
    ) -> Result<(), Error> {
        if let Some(ids) = patch.tag_ids.as_ref() {
            self.ensure_attributes_owned(caller, AttributeKind::Tag, ids)
                .await?;
        }
        if let Some(ids) = patch.ingredient_ids.as_ref() {
            self.ensure_attributes_owned(caller, AttributeKind::Ingredient, ids)
                .await?;
        }
        Ok(())
    }

    /// Render `recipe` in the view selected by `operation`.
    async fn present(
        &self,
        operation: RecipeOperation,
        recipe: Recipe,
    ) -> Result<RecipeRepresentation, Error> {
        match operation.view() {
            RecipeView::Summary => Ok(RecipeRepresentation::Summary(recipe)),
            RecipeView::Detail => {
                let tags = self
                    .load_attributes(AttributeKind::Tag, recipe.tag_ids())
                    .await?;
                let ingredients = self
                    .load_attributes(AttributeKind::Ingredient, recipe.ingredient_ids())
                    .await?;
                Ok(RecipeRepresentation::Detail(RecipeDetail {
                    recipe,
                    tags,
                    ingredients,
                }))
            }
            RecipeView::ImageUpload => Ok(RecipeRepresentation::ImageUpload {
                id: recipe.id(),
                image: recipe.image().cloned(),
            }),
        }
    }

    async fn apply_and_store(
        &self,
        operation: RecipeOperation,
        caller: &UserId,
        id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeRepresentation, Error> {
        let mut recipe = self.owned_recipe(caller, id).await?;
        self.ensure_patch_references(caller, &patch).await?;
        recipe.apply(patch);
        self.recipes
            .update(&recipe)
            .await
            .map_err(Self::map_recipe_error)?;
        debug!(recipe_id = %id, "recipe updated");
        self.present(operation, recipe).await
    }
}

fn invalid_image_error() -> Error {
    image_field_error(
        "invalid_image",
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
    )
}

#[async_trait]
impl<R, A, S, G> RecipesQuery for RecipeService<R, A, S, G>
where
    R: RecipeRepository,
    A: AttributeRepository,
    S: ImageStore,
    G: ImageIdGenerator,
{
    async fn list(&self, caller: &UserId) -> Result<Vec<RecipeRepresentation>, Error> {
        let recipes = self
            .recipes
            .list_for_owner(caller)
            .await
            .map_err(Self::map_recipe_error)?;
        let mut out = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            out.push(self.present(RecipeOperation::List, recipe).await?);
        }
        Ok(out)
    }

    async fn retrieve(
        &self,
        caller: &UserId,
        id: &RecipeId,
    ) -> Result<RecipeRepresentation, Error> {
        let recipe = self.owned_recipe(caller, id).await?;
        self.present(RecipeOperation::Retrieve, recipe).await
    }
}

#[async_trait]
impl<R, A, S, G> RecipesCommand for RecipeService<R, A, S, G>
where
    R: RecipeRepository,
    A: AttributeRepository,
    S: ImageStore,
    G: ImageIdGenerator,
{
    async fn create(
        &self,
        caller: &UserId,
        draft: RecipeDraft,
    ) -> Result<RecipeRepresentation, Error> {
        self.ensure_attributes_owned(caller, AttributeKind::Tag, &draft.tag_ids)
            .await?;
        self.ensure_attributes_owned(caller, AttributeKind::Ingredient, &draft.ingredient_ids)
            .await?;

        let recipe = Recipe::create(RecipeId::random(), *caller, draft);
        self.recipes
            .insert(&recipe)
            .await
            .map_err(Self::map_recipe_error)?;
        info!(recipe_id = %recipe.id(), owner = %caller, "recipe created");
        self.present(RecipeOperation::Create, recipe).await
    }

    async fn update(
        &self,
        caller: &UserId,
        id: &RecipeId,
        draft: RecipeDraft,
    ) -> Result<RecipeRepresentation, Error> {
        self.apply_and_store(RecipeOperation::Update, caller, id, RecipePatch::from(draft))
            .await
    }

    async fn partial_update(
        &self,
        caller: &UserId,
        id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeRepresentation, Error> {
        self.apply_and_store(RecipeOperation::PartialUpdate, caller, id, patch)
            .await
    }

    async fn delete(&self, caller: &UserId, id: &RecipeId) -> Result<(), Error> {
        self.owned_recipe(caller, id).await?;
        let deleted = self
            .recipes
            .delete(id)
            .await
            .map_err(Self::map_recipe_error)?;
        if !deleted {
            return Err(Self::not_found());
        }
        info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }

    async fn upload_image(
        &self,
        caller: &UserId,
        id: &RecipeId,
        upload: ImageUpload,
    ) -> Result<RecipeRepresentation, Error> {
        let mut recipe = self.owned_recipe(caller, id).await?;
        let ImageUpload { filename, bytes } = upload;
        if bytes.is_empty() {
            return Err(image_field_error("required", "No file was submitted."));
        }

        let path = name_for(&filename, self.image_ids.as_ref()).map_err(|err| {
            let code = match err {
                ImageNameError::MissingExtension => "missing_extension",
                ImageNameError::InvalidExtension | ImageNameError::UnsupportedExtension { .. } => {
                    "invalid_extension"
                }
            };
            image_field_error(code, err.to_string())
        })?;
        let promised = extension_of(&path).and_then(format_for_extension);

        // Decoding runs off the runtime; errors are built here so they pick
        // up the request trace id.
        let (bytes, detected, decoded) = tokio::task::spawn_blocking(move || {
            let detected = image::guess_format(&bytes).ok();
            let decoded = image::load_from_memory(&bytes).map(|_| ());
            (bytes, detected, decoded)
        })
        .await
        .map_err(|err| Error::internal(format!("image validation task failed: {err}")))?;
        if let Err(err) = decoded {
            debug!(recipe_id = %id, error = %err, "rejected undecodable upload");
            return Err(invalid_image_error());
        }
        if detected.is_none() || detected != promised {
            debug!(recipe_id = %id, ?detected, ?promised, "rejected mismatched upload");
            return Err(image_field_error(
                "extension_mismatch",
                "The file extension does not match the image content.",
            ));
        }

        self.images
            .store(&path, &bytes)
            .await
            .map_err(Self::map_image_error)?;
        self.recipes
            .set_image(id, &path)
            .await
            .map_err(Self::map_recipe_error)?;
        info!(recipe_id = %id, image = %path, "recipe image stored");

        recipe.set_image(path);
        self.present(RecipeOperation::UploadImage, recipe).await
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
