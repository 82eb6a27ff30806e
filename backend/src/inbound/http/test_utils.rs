//! Test helpers for inbound HTTP components.
//!
//! [`TestApp`] wires the real routes over [`InMemoryBackend`], so handler
//! tests exercise the domain services end to end without a database.

use std::io::Cursor;

use actix_http::Request;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::Trace;
use crate::domain::UserId;
use crate::inbound::http::configure;
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;
use crate::test_support::InMemoryBackend;

const BOUNDARY: &str = "recipe-test-boundary";

/// Build an app serving every API route under `/api` with the production
/// extractor configuration.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(web::scope("/api").configure(configure))
}

/// In-memory backend plus the HTTP state built from it.
pub struct TestApp {
    pub backend: InMemoryBackend,
    state: web::Data<HttpState>,
}

impl TestApp {
    pub fn new() -> Self {
        let backend = InMemoryBackend::new();
        let state = web::Data::new(backend.http_state());
        Self { backend, state }
    }

    /// Same as [`TestApp::new`] with a smaller upload ceiling.
    pub fn with_upload_limit(limit: usize) -> Self {
        let backend = InMemoryBackend::new();
        let state = web::Data::new(backend.http_state().with_max_upload_bytes(limit));
        Self { backend, state }
    }

    /// Send `request` and return the raw response.
    pub async fn call(&self, request: Request) -> ServiceResponse {
        let app = actix_test::init_service(test_app(self.state.clone())).await;
        actix_test::call_service(&app, request).await
    }

    /// Send `request` and decode the body as JSON (`null` when empty).
    pub async fn call_json(&self, request: Request) -> (StatusCode, Value) {
        let response = self.call(request).await;
        let status = response.status();
        (status, read_json(response).await)
    }

    /// Register `email` and return its id with a valid token.
    pub async fn login(&self, email: &str) -> (UserId, String) {
        let (user, token) = self
            .backend
            .user_with_token(email, "testpass123")
            .await
            .expect("user with token");
        (user.id(), token.expose().to_owned())
    }
}

/// Decode a response body as JSON, mapping an empty body to `null`.
pub async fn read_json(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).expect("JSON body")
}

/// `Authorization` header for `token`.
pub fn auth_header(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Token {token}"))
}

/// Encode one file field as `multipart/form-data`.
///
/// Returns the `Content-Type` header value and the body.
pub fn multipart_file(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(10, 10)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}
