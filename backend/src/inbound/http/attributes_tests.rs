//! Tests for the tag and ingredient handlers.

use std::collections::BTreeSet;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{RecipeAttributesCommand, RecipesCommand};
use crate::domain::{AttributeId, Cost, RecipeDraft, RecipeTitle, UserId};
use crate::inbound::http::test_utils::{TestApp, auth_header};

async fn create(app: &TestApp, token: &str, uri: &str, name: &str) -> Value {
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .insert_header(auth_header(token))
        .set_json(json!({ "name": name }))
        .to_request();
    let (status, body) = app.call_json(request).await;
    assert_eq!(status, StatusCode::CREATED, "create {name}: {body}");
    body
}

async fn list(app: &TestApp, token: &str, uri: &str) -> (StatusCode, Value) {
    let request = actix_test::TestRequest::get()
        .uri(uri)
        .insert_header(auth_header(token))
        .to_request();
    app.call_json(request).await
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect()
}

async fn attach(app: &TestApp, owner: UserId, tags: &[AttributeId], ingredients: &[AttributeId]) {
    let draft = RecipeDraft {
        title: RecipeTitle::new("Sample recipe").expect("title"),
        time_minutes: 5,
        cost: Cost::new(Decimal::new(500, 2)).expect("cost"),
        link: None,
        tag_ids: tags.iter().copied().collect::<BTreeSet<_>>(),
        ingredient_ids: ingredients.iter().copied().collect::<BTreeSet<_>>(),
    };
    app.backend
        .recipes
        .create(&owner, draft)
        .await
        .expect("recipe created");
}

async fn direct_attribute(
    app: &TestApp,
    owner: UserId,
    kind: AttributeKind,
    name: &str,
) -> AttributeId {
    app.backend
        .attributes
        .create(&owner, kind, AttributeName::new(name).expect("name"))
        .await
        .expect("attribute created")
        .id()
}

#[rstest]
#[case("/api/recipe/tags")]
#[case("/api/recipe/ingredients")]
#[actix_web::test]
async fn listing_requires_a_token(#[case] uri: &str) {
    let app = TestApp::new();

    let request = actix_test::TestRequest::get().uri(uri).to_request();
    let (status, body) = app.call_json(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("unauthorized"));
}

#[actix_web::test]
async fn unknown_token_is_unauthorised() {
    let app = TestApp::new();

    let (status, _) = list(&app, &"0".repeat(40), "/api/recipe/tags").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("/api/recipe/tags")]
#[case("/api/recipe/ingredients")]
#[actix_web::test]
async fn listing_is_scoped_to_the_caller_and_sorted(#[case] uri: &str) {
    let app = TestApp::new();
    let (_, mine) = app.login("mine@example.com").await;
    let (_, theirs) = app.login("theirs@example.com").await;
    create(&app, &mine, uri, "Kale").await;
    create(&app, &mine, uri, "Salt").await;
    create(&app, &theirs, uri, "Kale").await;
    create(&app, &theirs, uri, "Pepper").await;

    let (status, body) = list(&app, &mine, uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Salt", "Kale"]);
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
#[actix_web::test]
async fn blank_names_are_rejected_and_nothing_is_stored(#[case] name: &str) {
    let app = TestApp::new();
    let (user, token) = app.login("cook@example.com").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/recipe/tags")
        .insert_header(auth_header(&token))
        .set_json(json!({ "name": name }))
        .to_request();
    let (status, body) = app.call_json(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], json!("name"));
    assert_eq!(app.backend.store.attribute_count(&user, AttributeKind::Tag), 0);
}

#[actix_web::test]
async fn created_attribute_is_returned_with_its_id() {
    let app = TestApp::new();
    let (user, token) = app.login("cook@example.com").await;

    let body = create(&app, &token, "/api/recipe/ingredients", "Cabbage").await;

    assert_eq!(body["name"], json!("Cabbage"));
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(
        app.backend
            .store
            .attribute_count(&user, AttributeKind::Ingredient),
        1
    );
}

#[rstest]
#[case(AttributeKind::Tag, "/api/recipe/tags")]
#[case(AttributeKind::Ingredient, "/api/recipe/ingredients")]
#[actix_web::test]
async fn assigned_only_keeps_linked_entries_once(#[case] kind: AttributeKind, #[case] uri: &str) {
    let app = TestApp::new();
    let (user, token) = app.login("cook@example.com").await;
    let linked = direct_attribute(&app, user, kind, "Breakfast").await;
    direct_attribute(&app, user, kind, "Lunch").await;
    let ids = vec![linked];
    let none = Vec::new();
    for _ in 0..2 {
        match kind {
            AttributeKind::Tag => attach(&app, user, &ids, &none).await,
            AttributeKind::Ingredient => attach(&app, user, &none, &ids).await,
        }
    }

    let (status, body) = list(&app, &token, &format!("{uri}?assigned_only=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Breakfast"]);
}

#[actix_web::test]
async fn assigned_only_without_recipes_is_empty() {
    let app = TestApp::new();
    let (user, token) = app.login("cook@example.com").await;
    direct_attribute(&app, user, AttributeKind::Tag, "Unused").await;

    let (status, body) = list(&app, &token, "/api/recipe/tags?assigned_only=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn assigned_only_rejects_unknown_values() {
    let app = TestApp::new();
    let (_, token) = app.login("cook@example.com").await;

    let (status, body) = list(&app, &token, "/api/recipe/tags?assigned_only=maybe").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], json!("assigned_only"));
}
