//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/recipe/recipes
//! POST   /api/recipe/recipes
//! GET    /api/recipe/recipes/{id}
//! PUT    /api/recipe/recipes/{id}
//! PATCH  /api/recipe/recipes/{id}
//! DELETE /api/recipe/recipes/{id}
//! POST   /api/recipe/recipes/{id}/upload-image   (multipart, field `image`)
//! ```
//!
//! The response shape follows the [`RecipeRepresentation`] the domain returns;
//! clients never choose it.

use std::str::FromStr;

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ImageUpload;
use crate::domain::{
    Cost, Error, Recipe, RecipeDetail, RecipeDraft, RecipeId, RecipeLink, RecipePatch,
    RecipeRepresentation, RecipeTitle,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::attributes::AttributeResponse;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    COST, INGREDIENTS, TAGS, TIME_MINUTES, TITLE, invalid_number_error, max_value_error,
    min_value_error, missing_field_error, parse_attribute_ids, recipe_field_error,
};

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

/// Body for creating, replacing or patching a recipe.
///
/// `cost` accepts a decimal string (`"5.50"`) or a JSON number.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    #[schema(example = "Chicken tikka")]
    pub title: Option<String>,
    #[schema(example = 30)]
    pub time_minutes: Option<i64>,
    #[schema(value_type = Option<String>, example = "5.50")]
    pub cost: Option<Value>,
    #[schema(example = "https://example.com/tikka")]
    pub link: Option<String>,
    /// Tag ids owned by the caller.
    pub tags: Option<Vec<String>>,
    /// Ingredient ids owned by the caller.
    pub ingredients: Option<Vec<String>>,
}

/// Recipe with tag and ingredient ids.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub time_minutes: u32,
    #[schema(example = "5.50")]
    pub cost: String,
    pub link: String,
}

/// Recipe with tags and ingredients expanded.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<AttributeResponse>,
    pub tags: Vec<AttributeResponse>,
    pub time_minutes: u32,
    #[schema(example = "5.50")]
    pub cost: String,
    pub link: String,
    #[schema(example = "uploads/recipe/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub image: Option<String>,
}

/// Result of an image upload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: String,
    pub image: Option<String>,
}

/// OpenAPI description of the upload form.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RecipeImageForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Any recipe response body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecipeBody {
    Summary(RecipeSummaryResponse),
    Detail(RecipeDetailResponse),
    Image(RecipeImageResponse),
}

fn cost_text(cost: Cost) -> String {
    cost.to_string()
}

fn link_text(recipe: &Recipe) -> String {
    recipe
        .link()
        .map_or_else(String::new, |link| link.as_ref().to_owned())
}

impl From<&Recipe> for RecipeSummaryResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id().to_string(),
            title: recipe.title().as_ref().to_owned(),
            ingredients: recipe
                .ingredient_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            tags: recipe.tag_ids().iter().map(ToString::to_string).collect(),
            time_minutes: recipe.time_minutes(),
            cost: cost_text(recipe.cost()),
            link: link_text(recipe),
        }
    }
}

impl From<&RecipeDetail> for RecipeDetailResponse {
    fn from(detail: &RecipeDetail) -> Self {
        let recipe = &detail.recipe;
        Self {
            id: recipe.id().to_string(),
            title: recipe.title().as_ref().to_owned(),
            ingredients: detail
                .ingredients
                .iter()
                .map(AttributeResponse::from)
                .collect(),
            tags: detail.tags.iter().map(AttributeResponse::from).collect(),
            time_minutes: recipe.time_minutes(),
            cost: cost_text(recipe.cost()),
            link: link_text(recipe),
            image: recipe.image().map(ToString::to_string),
        }
    }
}

impl From<RecipeRepresentation> for RecipeBody {
    fn from(representation: RecipeRepresentation) -> Self {
        match representation {
            RecipeRepresentation::Summary(recipe) => Self::Summary((&recipe).into()),
            RecipeRepresentation::Detail(detail) => Self::Detail((&detail).into()),
            RecipeRepresentation::ImageUpload { id, image } => Self::Image(RecipeImageResponse {
                id: id.to_string(),
                image: image.map(|path| path.to_string()),
            }),
        }
    }
}

fn parse_recipe_id(raw: &str) -> Result<RecipeId, Error> {
    Uuid::parse_str(raw)
        .map(RecipeId::from_uuid)
        .map_err(|_| Error::not_found("Not found."))
}

fn parse_title(raw: String) -> Result<RecipeTitle, Error> {
    RecipeTitle::new(raw).map_err(recipe_field_error)
}

fn parse_time(raw: i64) -> Result<u32, Error> {
    let max = i64::from(i32::MAX);
    if raw < 0 {
        return Err(min_value_error(TIME_MINUTES, 0));
    }
    if raw > max {
        return Err(max_value_error(TIME_MINUTES, max));
    }
    u32::try_from(raw).map_err(|_| max_value_error(TIME_MINUTES, max))
}

fn parse_cost(raw: &Value) -> Result<Cost, Error> {
    let text = match raw {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        other => return Err(invalid_number_error(COST, &other.to_string())),
    };
    let value = Decimal::from_str(&text).map_err(|_| invalid_number_error(COST, &text))?;
    Cost::new(value).map_err(recipe_field_error)
}

fn parse_link(raw: &str) -> Result<Option<RecipeLink>, Error> {
    RecipeLink::parse(raw).map_err(recipe_field_error)
}

fn parse_draft(payload: RecipeRequest) -> Result<RecipeDraft, Error> {
    let title = payload.title.ok_or_else(|| missing_field_error(TITLE))?;
    let time_minutes = payload
        .time_minutes
        .ok_or_else(|| missing_field_error(TIME_MINUTES))?;
    let cost = payload.cost.ok_or_else(|| missing_field_error(COST))?;

    Ok(RecipeDraft {
        title: parse_title(title)?,
        time_minutes: parse_time(time_minutes)?,
        cost: parse_cost(&cost)?,
        link: payload.link.as_deref().map(parse_link).transpose()?.flatten(),
        tag_ids: parse_attribute_ids(payload.tags.unwrap_or_default(), TAGS)?,
        ingredient_ids: parse_attribute_ids(payload.ingredients.unwrap_or_default(), INGREDIENTS)?,
    })
}

fn parse_patch(payload: RecipeRequest) -> Result<RecipePatch, Error> {
    Ok(RecipePatch {
        title: payload.title.map(parse_title).transpose()?,
        time_minutes: payload.time_minutes.map(parse_time).transpose()?,
        cost: payload.cost.as_ref().map(parse_cost).transpose()?,
        link: payload.link.as_deref().map(parse_link).transpose()?,
        tag_ids: payload
            .tags
            .map(|ids| parse_attribute_ids(ids, TAGS))
            .transpose()?,
        ingredient_ids: payload
            .ingredients
            .map(|ids| parse_attribute_ids(ids, INGREDIENTS))
            .transpose()?,
    })
}

fn multipart_error(err: MultipartError) -> Error {
    debug!(error = %err, "rejected multipart body");
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

async fn read_limited(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(Error::invalid_field(
                IMAGE_FIELD,
                "file_too_large",
                format!("image must be at most {limit} bytes"),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pull the `image` field out of a multipart body, skipping other fields.
async fn read_image(mut multipart: Multipart, limit: usize) -> Result<ImageUpload, Error> {
    while let Some(mut field) = multipart.try_next().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .unwrap_or_default()
            .to_owned();
        let bytes = read_limited(&mut field, limit).await?;
        return Ok(ImageUpload { filename, bytes });
    }
    Err(Error::invalid_field(
        IMAGE_FIELD,
        "required",
        "No file was submitted.",
    ))
}

/// List the caller's recipes in creation order.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    responses(
        (status = 200, description = "Recipes", body = [RecipeSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipe/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<RecipeBody>>> {
    let recipes = state.recipes.list(&caller.id()).await?;
    Ok(web::Json(recipes.into_iter().map(RecipeBody::from).collect()))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeSummaryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipe/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let created = state.recipes_command.create(&caller.id(), draft).await?;
    Ok(HttpResponse::Created().json(RecipeBody::from(created)))
}

/// Fetch one of the caller's recipes with tags and ingredients expanded.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetailResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipe/recipes/{id}")]
pub async fn retrieve_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeBody>> {
    let id = parse_recipe_id(&path)?;
    let recipe = state.recipes.retrieve(&caller.id(), &id).await?;
    Ok(web::Json(recipe.into()))
}

/// Replace every editable field of a recipe.
#[utoipa::path(
    put,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeSummaryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
#[put("/recipe/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeBody>> {
    let id = parse_recipe_id(&path)?;
    let draft = parse_draft(payload.into_inner())?;
    let updated = state
        .recipes_command
        .update(&caller.id(), &id, draft)
        .await?;
    Ok(web::Json(updated.into()))
}

/// Change only the supplied fields of a recipe.
#[utoipa::path(
    patch,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeSummaryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipe/recipes/{id}")]
pub async fn partial_update_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeBody>> {
    let id = parse_recipe_id(&path)?;
    let patch = parse_patch(payload.into_inner())?;
    let updated = state
        .recipes_command
        .partial_update(&caller.id(), &id, patch)
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete one of the caller's recipes.
#[utoipa::path(
    delete,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipe/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_recipe_id(&path)?;
    state.recipes_command.delete(&caller.id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach an image to one of the caller's recipes.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes/{id}/upload-image",
    params(("id" = String, Path, description = "Recipe id")),
    request_body(content = RecipeImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "uploadRecipeImage"
)]
#[post("/recipe/recipes/{id}/upload-image")]
pub async fn upload_recipe_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    request: HttpRequest,
    payload: web::Payload,
) -> ApiResult<web::Json<RecipeBody>> {
    let id = parse_recipe_id(&path)?;
    let multipart = Multipart::new(request.headers(), payload);
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let stored = state
        .recipes_command
        .upload_image(&caller.id(), &id, upload)
        .await?;
    Ok(web::Json(stored.into()))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
