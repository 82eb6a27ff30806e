//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Recipe rows and their tag and ingredient links are read and written in a
//! single transaction so callers never observe a recipe with a partially
//! applied association set.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    AttributeId, Cost, ImagePath, Recipe, RecipeId, RecipeLink, RecipeTitle, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRecipeRow, RecipeRow, RecipeUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{recipe_ingredients, recipe_tags, recipes};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    map_basic_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    map_basic_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

fn time_for_db(minutes: u32) -> Result<i32, RecipeRepositoryError> {
    i32::try_from(minutes)
        .map_err(|_| RecipeRepositoryError::query(format!("time_minutes out of range: {minutes}")))
}

/// Link rows grouped by recipe id.
type LinkMap = HashMap<Uuid, BTreeSet<AttributeId>>;

/// Recipe rows plus their tag and ingredient links.
type RecipeRows = (Vec<RecipeRow>, LinkMap, LinkMap);

fn group_links(pairs: Vec<(Uuid, Uuid)>) -> LinkMap {
    let mut grouped = LinkMap::new();
    for (recipe_id, attribute_id) in pairs {
        grouped
            .entry(recipe_id)
            .or_default()
            .insert(AttributeId::from_uuid(attribute_id));
    }
    grouped
}

fn row_to_recipe(
    row: RecipeRow,
    tags: &mut LinkMap,
    ingredients: &mut LinkMap,
) -> Result<Recipe, RecipeRepositoryError> {
    let invalid = |field: &str, err: &dyn std::fmt::Display| {
        RecipeRepositoryError::query(format!("invalid stored recipe {field}: {err}"))
    };
    let title = RecipeTitle::new(row.title).map_err(|err| invalid("title", &err))?;
    let time_minutes = u32::try_from(row.time_minutes).map_err(|err| invalid("time", &err))?;
    let cost = Cost::new(row.cost).map_err(|err| invalid("cost", &err))?;
    let link = RecipeLink::parse(&row.link).map_err(|err| invalid("link", &err))?;

    Ok(Recipe::from_parts(
        RecipeId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        title,
        time_minutes,
        cost,
        link,
        row.image.map(ImagePath::new),
        tags.remove(&row.id).unwrap_or_default(),
        ingredients.remove(&row.id).unwrap_or_default(),
    ))
}

/// Attach the tag and ingredient links of already loaded recipe rows.
async fn load_with_links(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> QueryResult<RecipeRows> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let tags = recipe_tags::table
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .select((recipe_tags::recipe_id, recipe_tags::tag_id))
        .load(conn)
        .await?;
    let ingredients = recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .select((recipe_ingredients::recipe_id, recipe_ingredients::ingredient_id))
        .load(conn)
        .await?;
    Ok((rows, group_links(tags), group_links(ingredients)))
}

async fn insert_links(conn: &mut AsyncPgConnection, recipe: &Recipe) -> QueryResult<()> {
    let recipe_id = *recipe.id().as_uuid();
    let tag_rows: Vec<_> = recipe
        .tag_ids()
        .iter()
        .map(|id| {
            (
                recipe_tags::recipe_id.eq(recipe_id),
                recipe_tags::tag_id.eq(*id.as_uuid()),
            )
        })
        .collect();
    if !tag_rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&tag_rows)
            .execute(conn)
            .await?;
    }
    let ingredient_rows: Vec<_> = recipe
        .ingredient_ids()
        .iter()
        .map(|id| {
            (
                recipe_ingredients::recipe_id.eq(recipe_id),
                recipe_ingredients::ingredient_id.eq(*id.as_uuid()),
            )
        })
        .collect();
    if !ingredient_rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn delete_links(conn: &mut AsyncPgConnection, recipe_id: Uuid) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    Ok(())
}

impl DieselRecipeRepository {
    fn convert(rows: RecipeRows) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let (rows, mut tags, mut ingredients) = rows;
        rows.into_iter()
            .map(|row| row_to_recipe(row, &mut tags, &mut ingredients))
            .collect()
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *owner.as_uuid();
        let rows = conn
            .transaction(|conn| {
                async move {
                    let rows: Vec<RecipeRow> = recipes::table
                        .filter(recipes::user_id.eq(owner))
                        .order_by((recipes::created_at.asc(), recipes::id.asc()))
                        .select(RecipeRow::as_select())
                        .load(conn)
                        .await?;
                    load_with_links(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Self::convert(rows)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        let rows = conn
            .transaction(|conn| {
                async move {
                    let rows: Vec<RecipeRow> = recipes::table
                        .filter(recipes::id.eq(id))
                        .select(RecipeRow::as_select())
                        .load(conn)
                        .await?;
                    load_with_links(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(Self::convert(rows)?.into_iter().next())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRecipeRow {
            id: *recipe.id().as_uuid(),
            user_id: *recipe.owner().as_uuid(),
            title: recipe.title().as_ref(),
            time_minutes: time_for_db(recipe.time_minutes())?,
            cost: recipe.cost().value(),
            link: recipe.link().map_or("", AsRef::as_ref),
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(recipes::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                insert_links(conn, recipe).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *recipe.id().as_uuid();
        let changes = RecipeUpdate {
            title: recipe.title().as_ref(),
            time_minutes: time_for_db(recipe.time_minutes())?,
            cost: recipe.cost().value(),
            link: recipe.link().map_or("", AsRef::as_ref),
        };

        conn.transaction(|conn| {
            async move {
                diesel::update(recipes::table.filter(recipes::id.eq(id)))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                delete_links(conn, id).await?;
                insert_links(conn, recipe).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        conn.transaction(|conn| {
            async move {
                delete_links(conn, id).await?;
                let removed = diesel::delete(recipes::table.filter(recipes::id.eq(id)))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn set_image(
        &self,
        id: &RecipeId,
        image: &ImagePath,
    ) -> Result<(), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(recipes::table.filter(recipes::id.eq(id.as_uuid())))
            .set(recipes::image.eq(Some(image.as_ref())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn row(link: &str) -> RecipeRow {
        RecipeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Sample recipe".to_owned(),
            time_minutes: 10,
            cost: Decimal::new(500, 2),
            link: link.to_owned(),
            image: None,
        }
    }

    #[rstest]
    fn links_are_attached_to_their_recipe() {
        let stored = row("");
        let tag = Uuid::new_v4();
        let mut tags = group_links(vec![(stored.id, tag), (Uuid::new_v4(), Uuid::new_v4())]);
        let mut ingredients = LinkMap::new();

        let recipe = row_to_recipe(stored, &mut tags, &mut ingredients).expect("valid row");

        assert_eq!(
            recipe.tag_ids(),
            &BTreeSet::from([AttributeId::from_uuid(tag)])
        );
        assert!(recipe.ingredient_ids().is_empty());
    }

    #[rstest]
    #[case("", None)]
    #[case("https://example.com/r", Some("https://example.com/r"))]
    fn empty_link_column_means_no_link(#[case] stored: &str, #[case] expected: Option<&str>) {
        let recipe = row_to_recipe(row(stored), &mut LinkMap::new(), &mut LinkMap::new())
            .expect("valid row");

        assert_eq!(recipe.link().map(AsRef::as_ref), expected);
    }

    #[rstest]
    fn negative_stored_time_is_a_query_error() {
        let mut stored = row("");
        stored.time_minutes = -1;

        let error = row_to_recipe(stored, &mut LinkMap::new(), &mut LinkMap::new())
            .expect_err("negative time");

        assert!(matches!(error, RecipeRepositoryError::Query { .. }));
    }

    #[rstest]
    fn oversized_time_is_rejected_before_writing() {
        assert!(time_for_db(u32::MAX).is_err());
        assert_eq!(time_for_db(90).expect("fits"), 90);
    }
}
