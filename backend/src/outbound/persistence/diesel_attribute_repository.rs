//! PostgreSQL-backed `AttributeRepository` implementation using Diesel ORM.
//!
//! Tags and ingredients live in separate tables with identical shape, each
//! with its own recipe link table. [`attribute_table_queries!`] generates one
//! query module per table so both kinds share a single adapter.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{AttributeRepository, AttributeRepositoryError};
use crate::domain::{
    Attribute, AttributeFilter, AttributeId, AttributeKind, AttributeName, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};

/// Row shape shared by the `tags` and `ingredients` tables.
#[derive(Debug, Clone, Queryable)]
struct AttributeRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
}

/// Generate insert, owner listing and id lookup queries for one attribute
/// table and its recipe link table.
macro_rules! attribute_table_queries {
    ($module:ident, $table:ident, $links:ident, $link_column:ident) => {
        mod $module {
            use diesel::prelude::*;
            use diesel_async::{AsyncPgConnection, RunQueryDsl};
            use uuid::Uuid;

            use super::super::schema::{$links, $table};
            use super::AttributeRow;

            pub(super) async fn insert(
                conn: &mut AsyncPgConnection,
                id: Uuid,
                owner: Uuid,
                name: &str,
            ) -> QueryResult<()> {
                diesel::insert_into($table::table)
                    .values((
                        $table::id.eq(id),
                        $table::user_id.eq(owner),
                        $table::name.eq(name),
                    ))
                    .execute(conn)
                    .await
                    .map(|_| ())
            }

            pub(super) async fn list(
                conn: &mut AsyncPgConnection,
                owner: Uuid,
                assigned_only: bool,
            ) -> QueryResult<Vec<AttributeRow>> {
                let owned = $table::table
                    .filter($table::user_id.eq(owner))
                    .select(($table::id, $table::user_id, $table::name))
                    .order_by(($table::name.desc(), $table::id.desc()));
                if assigned_only {
                    // IN (subquery) yields each linked row once.
                    owned
                        .filter($table::id.eq_any($links::table.select($links::$link_column)))
                        .load(conn)
                        .await
                } else {
                    owned.load(conn).await
                }
            }

            pub(super) async fn find_by_ids(
                conn: &mut AsyncPgConnection,
                ids: &[Uuid],
            ) -> QueryResult<Vec<AttributeRow>> {
                $table::table
                    .filter($table::id.eq_any(ids))
                    .select(($table::id, $table::user_id, $table::name))
                    .load(conn)
                    .await
            }
        }
    };
}

attribute_table_queries!(tag_queries, tags, recipe_tags, tag_id);
attribute_table_queries!(ingredient_queries, ingredients, recipe_ingredients, ingredient_id);

/// Diesel-backed implementation of the `AttributeRepository` port.
#[derive(Clone)]
pub struct DieselAttributeRepository {
    pool: DbPool,
}

impl DieselAttributeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AttributeRepositoryError {
    map_basic_pool_error(error, AttributeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AttributeRepositoryError {
    map_basic_diesel_error(
        error,
        AttributeRepositoryError::query,
        AttributeRepositoryError::connection,
    )
}

fn row_to_attribute(
    kind: AttributeKind,
    row: AttributeRow,
) -> Result<Attribute, AttributeRepositoryError> {
    let name = AttributeName::new(row.name).map_err(|err| {
        AttributeRepositoryError::query(format!("invalid stored {kind} name: {err}"))
    })?;
    Ok(Attribute::new(
        AttributeId::from_uuid(row.id),
        kind,
        name,
        UserId::from_uuid(row.user_id),
    ))
}

fn rows_to_attributes(
    kind: AttributeKind,
    rows: Vec<AttributeRow>,
) -> Result<Vec<Attribute>, AttributeRepositoryError> {
    rows.into_iter()
        .map(|row| row_to_attribute(kind, row))
        .collect()
}

#[async_trait]
impl AttributeRepository for DieselAttributeRepository {
    async fn insert(&self, attribute: &Attribute) -> Result<(), AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *attribute.id().as_uuid();
        let owner = *attribute.owner().as_uuid();
        let name = attribute.name().as_ref();
        match attribute.kind() {
            AttributeKind::Tag => tag_queries::insert(&mut conn, id, owner, name).await,
            AttributeKind::Ingredient => {
                ingredient_queries::insert(&mut conn, id, owner, name).await
            }
        }
        .map_err(map_diesel_error)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *owner.as_uuid();
        let rows = match kind {
            AttributeKind::Tag => {
                tag_queries::list(&mut conn, owner, filter.assigned_only).await
            }
            AttributeKind::Ingredient => {
                ingredient_queries::list(&mut conn, owner, filter.assigned_only).await
            }
        }
        .map_err(map_diesel_error)?;
        rows_to_attributes(kind, rows)
    }

    async fn find_by_ids(
        &self,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = match kind {
            AttributeKind::Tag => tag_queries::find_by_ids(&mut conn, &ids).await,
            AttributeKind::Ingredient => ingredient_queries::find_by_ids(&mut conn, &ids).await,
        }
        .map_err(map_diesel_error)?;
        rows_to_attributes(kind, rows)
    }
}
