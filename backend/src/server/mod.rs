//! HTTP server assembly for the `recipe-backend` binary.
//!
//! [`create_server`] turns a [`ServerConfig`] into a bound Actix server:
//! adapters are wired in `state_builders`, then `build_app` mounts the API
//! under `/api`, the health probes at the root and Swagger UI in debug
//! builds.

mod config;
mod state_builders;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use recipe_backend::Trace;
use recipe_backend::inbound::http::configure;
use recipe_backend::inbound::http::error::{json_error_handler, query_error_handler};
use recipe_backend::inbound::http::health::{HealthState, live, ready};
use recipe_backend::inbound::http::state::HttpState;

use state_builders::build_http_state;

/// Shared state handed to every worker's `App`.
#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json = web::JsonConfig::default().error_handler(json_error_handler);
    let query = web::QueryConfig::default().error_handler(query_error_handler);

    let app = App::new()
        .app_data(deps.health_state)
        .app_data(deps.http_state)
        .app_data(json)
        .app_data(query)
        .wrap(Trace)
        .service(web::scope("/api").configure(configure))
        .service(ready)
        .service(live);

    mount_docs(app)
}

#[cfg(debug_assertions)]
fn mount_docs<T>(app: App<T>) -> App<T>
where
    T: ServiceFactory<ServiceRequest, Config = (), Error = actix_web::Error, InitError = ()>,
{
    use recipe_backend::doc::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(not(debug_assertions))]
fn mount_docs<T>(app: App<T>) -> App<T> {
    app
}

/// Bind the listener and start serving.
///
/// The returned [`HealthState`] is already marked ready; its readiness probe
/// pings the configured pool on every check.
///
/// # Errors
/// Binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let probe = Arc::new(config.db_pool.clone());
    let health_state = web::Data::new(HealthState::new().with_probe(probe));
    let http_state = build_http_state(&config);

    let worker_health = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: worker_health.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok((server, health_state))
}
