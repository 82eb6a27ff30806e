//! Port for recipe persistence, including tag and ingredient links.

use async_trait::async_trait;

use crate::domain::{ImagePath, Recipe, RecipeId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

/// Storage for recipes and their association sets.
///
/// Writes that touch association rows run in a single transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Recipes owned by `owner`, in creation order.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    /// Fetch a recipe by id regardless of owner.
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Persist a new recipe with its associations.
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError>;

    /// Overwrite scalar fields and association sets. Owner and image are
    /// left as stored.
    async fn update(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError>;

    /// Delete a recipe and its associations. Returns `false` when absent.
    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Record the stored image path.
    async fn set_image(&self, id: &RecipeId, image: &ImagePath)
    -> Result<(), RecipeRepositoryError>;
}
