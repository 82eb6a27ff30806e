//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod attributes;
pub mod auth;
pub mod error;
pub mod health;
pub mod recipes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every API route. Callers mount this under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::create_user)
        .service(users::create_token)
        .service(attributes::list_tags)
        .service(attributes::create_tag)
        .service(attributes::list_ingredients)
        .service(attributes::create_ingredient)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::retrieve_recipe)
        .service(recipes::update_recipe)
        .service(recipes::partial_update_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::upload_recipe_image);
}
