//! Account domain services.
//!
//! Implements registration, login and token resolution on top of the user
//! and token repositories, plus the operator helpers used by the management
//! binaries.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AuthTokenRepository, AuthTokenRepositoryError, CredentialHasher, CredentialHasherError,
    LoginService, Registration, TokenAuthenticator, UserPersistenceError, UserRegistration,
    UserRepository,
};
use crate::domain::{
    AuthToken, EmailAddress, Error, HashedPassword, LoginCredentials, PasswordPolicy, User,
    UserFlags, UserId, UserName, UserValidationError,
};

/// Message returned for any failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Unable to authenticate with provided credentials";

/// Account service implementing the identity driving ports.
#[derive(Clone)]
pub struct AccountService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    policy: PasswordPolicy,
}

impl<U, T, H> AccountService<U, T, H> {
    /// Create a new service with the given adapters.
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>, policy: PasswordPolicy) -> Self {
        Self {
            users,
            tokens,
            hasher,
            policy,
        }
    }
}

impl<U, T, H> AccountService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: CredentialHasher + 'static,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => Error::invalid_field(
                "email",
                "duplicate_email",
                "user with this email already exists",
            ),
        }
    }

    fn map_token_error(error: AuthTokenRepositoryError) -> Error {
        match error {
            AuthTokenRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("token repository unavailable: {message}"))
            }
            AuthTokenRepositoryError::Query { message } => {
                Error::internal(format!("token repository error: {message}"))
            }
        }
    }

    fn map_hasher_error(error: CredentialHasherError) -> Error {
        Error::internal(format!("credential hashing failed: {error}"))
    }

    fn map_email_error(error: UserValidationError) -> Error {
        let code = match error {
            UserValidationError::EmptyEmail => "blank",
            UserValidationError::EmailTooLong { .. } => "max_length",
            _ => "invalid",
        };
        Error::invalid_field("email", code, error.to_string())
    }

    fn invalid_credentials() -> Error {
        Error::invalid_request(INVALID_CREDENTIALS_MESSAGE)
            .with_details(json!({ "code": "invalid_credentials" }))
    }

    async fn hash_password(&self, password: Zeroizing<String>) -> Result<HashedPassword, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(Self::map_hasher_error)
    }

    async fn verify_password(
        &self,
        password: Zeroizing<String>,
        hash: HashedPassword,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
            .map_err(Self::map_hasher_error)
    }

    async fn create_with_flags(
        &self,
        email: EmailAddress,
        password: Option<Zeroizing<String>>,
        name: UserName,
        flags: UserFlags,
    ) -> Result<User, Error> {
        let password_hash = match password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let user = User::new(UserId::random(), email, name, password_hash, flags);
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user.id(), staff = flags.is_staff, "user created");
        Ok(user)
    }

    /// Create a regular user.
    ///
    /// The email is required and normalised. Passing `None` as the password
    /// creates an account that cannot log in.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        name: UserName,
    ) -> Result<User, Error> {
        let email = EmailAddress::new(email).map_err(Self::map_email_error)?;
        let password = password.map(|value| Zeroizing::new(value.to_owned()));
        self.create_with_flags(email, password, name, UserFlags::default())
            .await
    }

    /// Create a user with staff and superuser rights.
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, Error> {
        let email = EmailAddress::new(email).map_err(Self::map_email_error)?;
        let password = Some(Zeroizing::new(password.to_owned()));
        self.create_with_flags(email, password, UserName::default(), UserFlags::superuser())
            .await
    }

    /// Look up a user by email.
    pub async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, Error> {
        self.users
            .find_by_email(email)
            .await
            .map_err(Self::map_user_error)
    }

    /// Delete a user and everything they own. Returns `false` when the user
    /// did not exist.
    pub async fn delete_user(&self, id: &UserId) -> Result<bool, Error> {
        let deleted = self
            .users
            .delete_with_dependents(id)
            .await
            .map_err(Self::map_user_error)?;
        if deleted {
            info!(user_id = %id, "user deleted");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl<U, T, H> UserRegistration for AccountService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: CredentialHasher + 'static,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            password,
            name,
        } = registration;
        self.policy.check(password.as_str()).map_err(|err| {
            Error::invalid_field("password", "password_too_short", err.to_string())
        })?;
        if name.is_blank() {
            return Err(Error::invalid_field(
                "name",
                "blank",
                "name must not be blank",
            ));
        }
        self.create_with_flags(email, Some(password), name, UserFlags::default())
            .await
    }
}

#[async_trait]
impl<U, T, H> LoginService for AccountService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: CredentialHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            debug!("login rejected: unknown account");
            return Err(Self::invalid_credentials());
        };
        let Some(hash) = user.password_hash().cloned() else {
            debug!(user_id = %user.id(), "login rejected: account has no password");
            return Err(Self::invalid_credentials());
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        if !self.verify_password(password, hash).await? || !user.is_active() {
            debug!(user_id = %user.id(), "login rejected");
            return Err(Self::invalid_credentials());
        }

        let token = AuthToken::issue();
        self.tokens
            .replace(&user.id(), &token.digest())
            .await
            .map_err(Self::map_token_error)?;
        info!(user_id = %user.id(), "token issued");
        Ok(token)
    }
}

#[async_trait]
impl<U, T, H> TokenAuthenticator for AccountService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: CredentialHasher + 'static,
{
    async fn authenticate_token(&self, token: &AuthToken) -> Result<UserId, Error> {
        let user_id = self
            .tokens
            .find_user(&token.digest())
            .await
            .map_err(Self::map_token_error)?
            .ok_or_else(|| Error::unauthorized("Invalid token."))?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(Self::map_user_error)?;
        match user {
            Some(user) if user.is_active() => Ok(user_id),
            _ => Err(Error::unauthorized("User inactive or deleted.")),
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
