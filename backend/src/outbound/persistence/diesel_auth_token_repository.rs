//! PostgreSQL-backed `AuthTokenRepository` implementation using Diesel ORM.
//!
//! The `auth_tokens` table is keyed by user, so storing a digest upserts the
//! single row for that user and invalidates the token it replaces.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AuthTokenRepository, AuthTokenRepositoryError};
use crate::domain::{TokenDigest, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed implementation of the `AuthTokenRepository` port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenRepositoryError {
    map_basic_pool_error(error, AuthTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuthTokenRepositoryError {
    map_basic_diesel_error(
        error,
        AuthTokenRepositoryError::query,
        AuthTokenRepositoryError::connection,
    )
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn replace(
        &self,
        user: &UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAuthTokenRow {
            user_id: *user.as_uuid(),
            token_digest: digest.as_ref(),
        };

        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .on_conflict(auth_tokens::user_id)
            .do_update()
            .set((
                auth_tokens::token_digest.eq(excluded(auth_tokens::token_digest)),
                auth_tokens::created_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_user(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id: Option<Uuid> = auth_tokens::table
            .filter(auth_tokens::token_digest.eq(digest.as_ref()))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(user_id.map(UserId::from_uuid))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::build("invalid URL"));

        assert!(matches!(error, AuthTokenRepositoryError::Connection { .. }));
        assert!(error.to_string().contains("invalid URL"));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let error = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(error, AuthTokenRepositoryError::Query { .. }));
    }
}
