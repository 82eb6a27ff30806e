//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, RecipeAttributesCommand, RecipeAttributesQuery, RecipesCommand, RecipesQuery,
    TokenAuthenticator, UserRegistration,
};

/// Default ceiling for a single image upload, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenAuthenticator>,
    pub attributes: Arc<dyn RecipeAttributesQuery>,
    pub attributes_command: Arc<dyn RecipeAttributesCommand>,
    pub recipes: Arc<dyn RecipesQuery>,
    pub recipes_command: Arc<dyn RecipesCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenAuthenticator>,
    pub attributes: Arc<dyn RecipeAttributesQuery>,
    pub attributes_command: Arc<dyn RecipeAttributesCommand>,
    pub recipes: Arc<dyn RecipesQuery>,
    pub recipes_command: Arc<dyn RecipesCommand>,
    /// Largest accepted image upload, in bytes.
    pub max_upload_bytes: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            registration,
            login,
            tokens,
            attributes,
            attributes_command,
            recipes,
            recipes_command,
        } = ports;
        Self {
            registration,
            login,
            tokens,
            attributes,
            attributes_command,
            recipes,
            recipes_command,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size limit.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}
