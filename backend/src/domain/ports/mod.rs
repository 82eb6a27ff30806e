//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, stores, hashers) expose strongly typed
//! errors generated by [`define_port_error`]; driving ports return the
//! domain [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod attribute_repository;
mod auth_token_repository;
mod credential_hasher;
mod image_store;
mod login_service;
mod readiness_probe;
mod recipe_attributes;
mod recipe_repository;
mod recipes;
mod user_registration;
mod user_repository;

#[cfg(test)]
pub use attribute_repository::MockAttributeRepository;
pub use attribute_repository::{AttributeRepository, AttributeRepositoryError};
#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenRepository, AuthTokenRepositoryError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::{LoginService, TokenAuthenticator};
#[cfg(test)]
pub use readiness_probe::MockReadinessProbe;
pub use readiness_probe::{ReadinessProbe, ReadinessProbeError};
pub use recipe_attributes::{RecipeAttributesCommand, RecipeAttributesQuery};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
pub use recipes::{ImageUpload, RecipesCommand, RecipesQuery};
pub use user_registration::{Registration, UserRegistration};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
