//! Tag and ingredient HTTP handlers.
//!
//! ```text
//! GET  /api/recipe/tags?assigned_only=1
//! POST /api/recipe/tags {"name":"Vegan"}
//! GET  /api/recipe/ingredients?assigned_only=1
//! POST /api/recipe/ingredients {"name":"Salt"}
//! ```
//!
//! Both collections share one pair of helpers; the handlers differ only in
//! the [`AttributeKind`] they pass down.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Attribute, AttributeFilter, AttributeKind, AttributeName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ASSIGNED_ONLY, NAME, attribute_name_error, missing_field_error, parse_flag,
};

/// Query string accepted by the attribute listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttributeListQuery {
    /// `1`/`true` keeps only entries attached to at least one recipe.
    #[param(example = "1")]
    pub assigned_only: Option<String>,
}

/// Body for creating a tag or ingredient.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AttributeRequest {
    #[schema(example = "Vegan")]
    pub name: Option<String>,
}

/// A tag or ingredient as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AttributeResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
}

impl From<&Attribute> for AttributeResponse {
    fn from(attribute: &Attribute) -> Self {
        Self {
            id: attribute.id().to_string(),
            name: attribute.name().as_ref().to_owned(),
        }
    }
}

async fn list_attributes(
    state: &HttpState,
    caller: AuthenticatedUser,
    kind: AttributeKind,
    query: AttributeListQuery,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    let filter = AttributeFilter {
        assigned_only: parse_flag(query.assigned_only.as_deref(), ASSIGNED_ONLY)?,
    };
    let attributes = state.attributes.list(&caller.id(), kind, filter).await?;
    Ok(web::Json(
        attributes.iter().map(AttributeResponse::from).collect(),
    ))
}

async fn create_attribute(
    state: &HttpState,
    caller: AuthenticatedUser,
    kind: AttributeKind,
    payload: AttributeRequest,
) -> ApiResult<HttpResponse> {
    let raw = payload.name.ok_or_else(|| missing_field_error(NAME))?;
    let name = AttributeName::new(raw).map_err(attribute_name_error)?;
    let attribute = state
        .attributes_command
        .create(&caller.id(), kind, name)
        .await?;
    Ok(HttpResponse::Created().json(AttributeResponse::from(&attribute)))
}

/// List the caller's tags, name descending.
#[utoipa::path(
    get,
    path = "/api/recipe/tags",
    params(AttributeListQuery),
    responses(
        (status = 200, description = "Tags", body = [AttributeResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/recipe/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    list_attributes(&state, caller, AttributeKind::Tag, query.into_inner()).await
}

/// Create a tag owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/tags",
    request_body = AttributeRequest,
    responses(
        (status = 201, description = "Tag created", body = AttributeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
#[post("/recipe/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    create_attribute(&state, caller, AttributeKind::Tag, payload.into_inner()).await
}

/// List the caller's ingredients, name descending.
#[utoipa::path(
    get,
    path = "/api/recipe/ingredients",
    params(AttributeListQuery),
    responses(
        (status = 200, description = "Ingredients", body = [AttributeResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients"
)]
#[get("/recipe/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    list_attributes(&state, caller, AttributeKind::Ingredient, query.into_inner()).await
}

/// Create an ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/ingredients",
    request_body = AttributeRequest,
    responses(
        (status = 201, description = "Ingredient created", body = AttributeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "createIngredient"
)]
#[post("/recipe/ingredients")]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    create_attribute(&state, caller, AttributeKind::Ingredient, payload.into_inner()).await
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
