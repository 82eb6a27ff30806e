//! Builders wiring Diesel-backed adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;

use recipe_backend::domain::{
    AccountService, RecipeAttributeService, RecipeService, UuidImageIdGenerator,
};
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::hashing::Argon2Hasher;
use recipe_backend::outbound::persistence::{
    DieselAttributeRepository, DieselAuthTokenRepository, DieselRecipeRepository,
    DieselUserRepository,
};
use recipe_backend::outbound::storage::FsImageStore;

use super::ServerConfig;

/// Account use-cases over PostgreSQL.
type DieselAccountService =
    AccountService<DieselUserRepository, DieselAuthTokenRepository, Argon2Hasher>;

/// Recipe use-cases over PostgreSQL and the media directory.
type DieselRecipeService = RecipeService<
    DieselRecipeRepository,
    DieselAttributeRepository,
    FsImageStore,
    UuidImageIdGenerator,
>;

/// Build every port implementation from the configured pool and media root.
fn build_ports(config: &ServerConfig) -> HttpStatePorts {
    let pool = &config.db_pool;
    let accounts: Arc<DieselAccountService> = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselAuthTokenRepository::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
        config.password_policy,
    ));
    let attribute_repository = Arc::new(DieselAttributeRepository::new(pool.clone()));
    let attributes = Arc::new(RecipeAttributeService::new(Arc::clone(
        &attribute_repository,
    )));
    let recipes: Arc<DieselRecipeService> = Arc::new(RecipeService::new(
        Arc::new(DieselRecipeRepository::new(pool.clone())),
        attribute_repository,
        Arc::new(FsImageStore::new(config.media_root.clone())),
        Arc::new(UuidImageIdGenerator),
    ));

    HttpStatePorts {
        registration: accounts.clone(),
        login: accounts.clone(),
        tokens: accounts,
        attributes: attributes.clone(),
        attributes_command: attributes,
        recipes: recipes.clone(),
        recipes_command: recipes,
    }
}

/// Build the shared HTTP state for every worker.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(
        HttpState::new(build_ports(config)).with_max_upload_bytes(config.max_upload_bytes),
    )
}
