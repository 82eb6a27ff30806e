//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the database; a unique violation on insert
//! surfaces as [`UserPersistenceError::DuplicateEmail`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, HashedPassword, User, UserFlags, UserId, UserName};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{
    auth_tokens, ingredients, recipe_ingredients, recipe_tags, recipes, tags, users,
};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored email: {err}")))?;
    let name = UserName::new(row.name)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored name: {err}")))?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        email,
        name,
        row.password_hash.map(HashedPassword::new),
        UserFlags {
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
        },
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let flags = user.flags();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            name: user.name().as_ref(),
            password_hash: user.password_hash().map(AsRef::as_ref),
            is_active: flags.is_active,
            is_staff: flags.is_staff,
            is_superuser: flags.is_superuser,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email(user.email().as_ref())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete_with_dependents(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *id.as_uuid();

        // Link rows go first: they reference recipes owned by the user and
        // tags or ingredients owned by the user, possibly on others' recipes.
        conn.transaction(|conn| {
            async move {
                let own_recipes: Vec<Uuid> = recipes::table
                    .filter(recipes::user_id.eq(user_id))
                    .select(recipes::id)
                    .load(conn)
                    .await?;
                let own_tags: Vec<Uuid> = tags::table
                    .filter(tags::user_id.eq(user_id))
                    .select(tags::id)
                    .load(conn)
                    .await?;
                let own_ingredients: Vec<Uuid> = ingredients::table
                    .filter(ingredients::user_id.eq(user_id))
                    .select(ingredients::id)
                    .load(conn)
                    .await?;

                diesel::delete(
                    recipe_tags::table.filter(
                        recipe_tags::recipe_id
                            .eq_any(&own_recipes)
                            .or(recipe_tags::tag_id.eq_any(&own_tags)),
                    ),
                )
                .execute(conn)
                .await?;
                diesel::delete(
                    recipe_ingredients::table.filter(
                        recipe_ingredients::recipe_id
                            .eq_any(&own_recipes)
                            .or(recipe_ingredients::ingredient_id.eq_any(&own_ingredients)),
                    ),
                )
                .execute(conn)
                .await?;
                diesel::delete(recipes::table.filter(recipes::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(tags::table.filter(tags::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(ingredients::table.filter(ingredients::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(auth_tokens::table.filter(auth_tokens::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(users::table.filter(users::id.eq(user_id)))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
