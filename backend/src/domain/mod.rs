//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: the error envelope every adapter renders.
//! - [`User`], [`Attribute`] and [`Recipe`]: users and the rows they own.
//! - [`AccountService`], [`RecipeAttributeService`] and [`RecipeService`]:
//!   use-cases behind the driving ports in [`ports`].

pub mod account_service;
pub mod attribute;
pub mod attribute_service;
pub mod auth;
pub mod error;
pub mod image_naming;
pub mod ownership;
pub mod ports;
pub mod recipe;
pub mod recipe_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::attribute::{
    Attribute, AttributeFilter, AttributeId, AttributeKind, AttributeName,
    AttributeValidationError,
};
pub use self::attribute_service::RecipeAttributeService;
pub use self::auth::{
    AuthToken, LoginCredentials, LoginValidationError, MalformedTokenError, PasswordPolicy,
    PasswordPolicyError, TokenDigest,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image_naming::{ImageIdGenerator, UuidImageIdGenerator};
pub use self::recipe::{
    Cost, ImagePath, Recipe, RecipeDetail, RecipeDraft, RecipeId, RecipeLink, RecipeOperation,
    RecipePatch, RecipeRepresentation, RecipeTitle, RecipeValidationError, RecipeView,
};
pub use self::recipe_service::RecipeService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, HashedPassword, User, UserFlags, UserId, UserName, UserValidationError,
};
