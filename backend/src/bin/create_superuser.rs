//! Create an account with staff and superuser rights.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::sync::Arc;

use clap::Parser;
use recipe_backend::domain::AccountService;
use recipe_backend::outbound::hashing::Argon2Hasher;
use recipe_backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselUserRepository,
};
use recipe_backend::settings::AppSettings;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create a staff account with superuser rights",
    version
)]
struct CliArgs {
    /// Email address used to log in.
    #[arg(long, value_name = "email")]
    email: String,
    /// Password for the new account.
    #[arg(long, value_name = "password", env = "RECIPE_SUPERUSER_PASSWORD")]
    password: String,
    /// Database connection URL. Falls back to `RECIPE_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = AppSettings::load_without_cli("create-superuser").map_err(io::Error::other)?;
    let database_url = settings
        .database_url_or(args.database_url.as_deref())
        .map_err(io::Error::other)?;
    let pool = DbPool::new(settings.pool_config_for(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let accounts = AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselAuthTokenRepository::new(pool)),
        Arc::new(Argon2Hasher::new()),
        settings.password_policy(),
    );
    let user = accounts
        .create_superuser(&args.email, &args.password)
        .await
        .map_err(|error| io::Error::other(format!("create superuser: {error}")))?;

    println!("created superuser {} ({})", user.email(), user.id());
    Ok(())
}
