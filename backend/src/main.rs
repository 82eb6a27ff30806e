#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Backend entry-point: waits for PostgreSQL, applies migrations and serves
//! the REST API with OpenAPI docs in debug builds.

mod server;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_backend::outbound::persistence::{
    DbPool, PgProbe, run_pending_migrations, wait_until_available,
};
use recipe_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let database_url = settings.database_url()?.to_owned();

    let probe = PgProbe::new(&database_url);
    wait_until_available(&probe, settings.wait_interval(), None).await?;
    run_pending_migrations(&database_url).await?;

    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("failed to create database pool")?;
    let config = ServerConfig::from_settings(&settings, pool);
    let bind_addr = config.bind_addr();

    let (server, health_state) = create_server(config)?;
    info!(%bind_addr, "recipe API listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}
