//! In-memory adapters for tests.
//!
//! Every driven port has an implementation here that keeps its rows in a
//! mutex-guarded vector, so HTTP handlers and the `tests/` suite can run the
//! real domain services without PostgreSQL. Compiled for unit tests and when
//! the `test-support` feature is enabled.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AttributeRepository, AttributeRepositoryError, AuthTokenRepository,
    AuthTokenRepositoryError, ImageStore, ImageStoreError, LoginService, RecipeRepository,
    RecipeRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountService, Attribute, AttributeFilter, AttributeId, AttributeKind, AuthToken,
    EmailAddress, Error, ImagePath, LoginCredentials, PasswordPolicy, Recipe,
    RecipeAttributeService, RecipeId, RecipePatch, RecipeService, TokenDigest, User, UserId,
    UserName, UuidImageIdGenerator, attribute::sort_for_listing,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::hashing::Argon2Hasher;

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    tokens: HashMap<UserId, TokenDigest>,
    attributes: Vec<Attribute>,
    recipes: Vec<Recipe>,
}

/// Users, tokens, attributes and recipes held in memory.
///
/// Recipes keep insertion order, matching the creation-order listing of the
/// PostgreSQL adapter.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    /// Number of attributes of `kind` owned by `owner`.
    pub fn attribute_count(&self, owner: &UserId, kind: AttributeKind) -> usize {
        self.lock().map_or(0, |state| {
            state
                .attributes
                .iter()
                .filter(|a| a.owner() == *owner && a.kind() == kind)
                .count()
        })
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.lock().map_or(0, |state| state.users.len())
    }

    /// Stored copy of a recipe, bypassing owner checks.
    pub fn recipe(&self, id: &RecipeId) -> Option<Recipe> {
        self.lock()
            .ok()
            .and_then(|state| state.recipes.iter().find(|r| r.id() == *id).cloned())
    }
}

fn linked_ids(recipes: &[Recipe], kind: AttributeKind) -> BTreeSet<AttributeId> {
    recipes
        .iter()
        .flat_map(|recipe| match kind {
            AttributeKind::Tag => recipe.tag_ids().iter(),
            AttributeKind::Ingredient => recipe.ingredient_ids().iter(),
        })
        .copied()
        .collect()
}

/// Drop links to `removed` attributes, as the link-table cascade does.
fn unlink(recipe: &mut Recipe, removed: &BTreeSet<AttributeId>) {
    let keep = |ids: &BTreeSet<AttributeId>| -> BTreeSet<AttributeId> {
        ids.difference(removed).copied().collect()
    };
    let patch = RecipePatch {
        tag_ids: Some(keep(recipe.tag_ids())),
        ingredient_ids: Some(keep(recipe.ingredient_ids())),
        ..RecipePatch::default()
    };
    recipe.apply(patch);
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.users.iter().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.iter().find(|u| u.id() == *id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.iter().find(|u| u.email() == email).cloned())
    }

    async fn delete_with_dependents(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        state.recipes.retain(|r| r.owner() != *id);
        let (removed, kept): (Vec<Attribute>, Vec<Attribute>) =
            std::mem::take(&mut state.attributes)
                .into_iter()
                .partition(|a| a.owner() == *id);
        state.attributes = kept;
        let removed: BTreeSet<AttributeId> = removed.iter().map(Attribute::id).collect();
        for recipe in &mut state.recipes {
            unlink(recipe, &removed);
        }
        state.tokens.remove(id);
        let before = state.users.len();
        state.users.retain(|u| u.id() != *id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryStore {
    async fn replace(
        &self,
        user: &UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenRepositoryError> {
        let mut state = self.lock().map_err(AuthTokenRepositoryError::query)?;
        state.tokens.insert(*user, digest.clone());
        Ok(())
    }

    async fn find_user(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenRepositoryError> {
        let state = self.lock().map_err(AuthTokenRepositoryError::query)?;
        Ok(state
            .tokens
            .iter()
            .find(|(_, stored)| *stored == digest)
            .map(|(user, _)| *user))
    }
}

#[async_trait]
impl AttributeRepository for InMemoryStore {
    async fn insert(&self, attribute: &Attribute) -> Result<(), AttributeRepositoryError> {
        let mut state = self.lock().map_err(AttributeRepositoryError::query)?;
        state.attributes.push(attribute.clone());
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let state = self.lock().map_err(AttributeRepositoryError::query)?;
        let linked = filter
            .assigned_only
            .then(|| linked_ids(&state.recipes, kind));
        let mut found: Vec<Attribute> = state
            .attributes
            .iter()
            .filter(|a| a.owner() == *owner && a.kind() == kind)
            .filter(|a| linked.as_ref().is_none_or(|ids| ids.contains(&a.id())))
            .cloned()
            .collect();
        sort_for_listing(&mut found);
        Ok(found)
    }

    async fn find_by_ids(
        &self,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let state = self.lock().map_err(AttributeRepositoryError::query)?;
        let mut found: Vec<Attribute> = state
            .attributes
            .iter()
            .filter(|a| a.kind() == kind && ids.contains(&a.id()))
            .cloned()
            .collect();
        sort_for_listing(&mut found);
        Ok(found)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(state
            .recipes
            .iter()
            .filter(|r| r.owner() == *owner)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(state.recipes.iter().find(|r| r.id() == *id).cloned())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        state.recipes.push(recipe.clone());
        Ok(())
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        let slot = state
            .recipes
            .iter_mut()
            .find(|r| r.id() == recipe.id())
            .ok_or_else(|| RecipeRepositoryError::query(format!("no recipe {}", recipe.id())))?;
        *slot = recipe.clone();
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        let before = state.recipes.len();
        state.recipes.retain(|r| r.id() != *id);
        Ok(state.recipes.len() < before)
    }

    async fn set_image(
        &self,
        id: &RecipeId,
        image: &ImagePath,
    ) -> Result<(), RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        let recipe = state
            .recipes
            .iter_mut()
            .find(|r| r.id() == *id)
            .ok_or_else(|| RecipeRepositoryError::query(format!("no recipe {id}")))?;
        recipe.set_image(image.clone());
        Ok(())
    }
}

/// Image store keeping uploaded bytes keyed by path.
#[derive(Default)]
pub struct MemoryImageStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    /// Bytes stored at `path`, if any.
    pub fn stored(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().ok().and_then(|files| files.get(path).cloned())
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.lock().map_or(0, |files| files.len())
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(&self, path: &ImagePath, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| ImageStoreError::unavailable("image store lock poisoned"))?;
        files.insert(path.as_ref().to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// Account service over the in-memory store.
pub type InMemoryAccountService = AccountService<InMemoryStore, InMemoryStore, Argon2Hasher>;

/// Fully wired domain services backed by in-memory adapters.
pub struct InMemoryBackend {
    pub store: Arc<InMemoryStore>,
    pub images: Arc<MemoryImageStore>,
    pub accounts: Arc<InMemoryAccountService>,
    pub attributes: Arc<RecipeAttributeService<InMemoryStore>>,
    pub recipes:
        Arc<RecipeService<InMemoryStore, InMemoryStore, MemoryImageStore, UuidImageIdGenerator>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Wire every service with the default password policy and a cheap
    /// Argon2 configuration.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let images = Arc::new(MemoryImageStore::default());
        let hasher = Argon2Hasher::with_params(argon2::Params::MIN_M_COST, 1, 1)
            .unwrap_or_default();
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::new(hasher),
            PasswordPolicy::default(),
        ));
        let attributes = Arc::new(RecipeAttributeService::new(Arc::clone(&store)));
        let recipes = Arc::new(RecipeService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&images),
            Arc::new(UuidImageIdGenerator),
        ));
        Self {
            store,
            images,
            accounts,
            attributes,
            recipes,
        }
    }

    /// Port bundle for [`HttpState`].
    pub fn ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            registration: self.accounts.clone(),
            login: self.accounts.clone(),
            tokens: self.accounts.clone(),
            attributes: self.attributes.clone(),
            attributes_command: self.attributes.clone(),
            recipes: self.recipes.clone(),
            recipes_command: self.recipes.clone(),
        }
    }

    /// HTTP state with the default upload limit.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(self.ports())
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns the domain error from account creation or login.
    pub async fn user_with_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthToken), Error> {
        let name = UserName::new("Test name").map_err(|err| Error::internal(err.to_string()))?;
        let user = self
            .accounts
            .create_user(email, Some(password), name)
            .await?;
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = self.accounts.authenticate(&credentials).await?;
        Ok((user, token))
    }
}

/// Temporary media root for filesystem image store tests.
///
/// # Errors
///
/// Returns the I/O error raised while creating the directory.
#[cfg(feature = "test-support")]
pub fn temp_media_root() -> std::io::Result<tempfile::TempDir> {
    tempfile::Builder::new().prefix("recipe-media").tempdir()
}
