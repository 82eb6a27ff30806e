//! Users API handlers.
//!
//! ```text
//! POST /api/user/create {"email":"cook@example.com","password":"secret","name":"Cook"}
//! POST /api/user/token {"email":"cook@example.com","password":"secret"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::Registration;
use crate::domain::{EmailAddress, Error, LoginCredentials, LoginValidationError, User, UserName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    EMAIL, NAME, PASSWORD, blank_field_error, missing_field_error, user_field_error,
};

/// Registration body for `POST /api/user/create`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "secret")]
    pub password: Option<String>,
    #[schema(example = "Cook")]
    pub name: Option<String>,
}

/// Public view of a user. The password is never echoed.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            name: user.name().as_ref().to_owned(),
        }
    }
}

/// Login body for `POST /api/user/token`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "secret")]
    pub password: Option<String>,
}

/// Issued token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Send as `Authorization: Token <token>`.
    pub token: String,
}

fn parse_registration(payload: CreateUserRequest) -> Result<Registration, Error> {
    let email = payload.email.ok_or_else(|| missing_field_error(EMAIL))?;
    let password = payload.password.ok_or_else(|| missing_field_error(PASSWORD))?;
    let name = payload.name.ok_or_else(|| missing_field_error(NAME))?;

    Ok(Registration {
        email: EmailAddress::new(email).map_err(user_field_error)?,
        password: Zeroizing::new(password),
        name: UserName::new(name.trim()).map_err(user_field_error)?,
    })
}

fn parse_credentials(payload: TokenRequest) -> Result<LoginCredentials, Error> {
    let email = payload.email.ok_or_else(|| missing_field_error(EMAIL))?;
    let password = Zeroizing::new(payload.password.ok_or_else(|| missing_field_error(PASSWORD))?);
    LoginCredentials::try_from_parts(&email, &password).map_err(|err| match err {
        LoginValidationError::InvalidEmail(inner) => user_field_error(inner),
        LoginValidationError::EmptyPassword => blank_field_error(PASSWORD),
    })
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/user/create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/user/create")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let user = state.registration.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange credentials for a token, replacing any earlier token.
#[utoipa::path(
    post,
    path = "/api/user/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createToken",
    security([])
)]
#[post("/user/token")]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials = parse_credentials(payload.into_inner())?;
    let token = state.login.authenticate(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}
