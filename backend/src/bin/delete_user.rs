//! Delete an account together with its tokens, recipes, tags and
//! ingredients.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::sync::Arc;

use clap::Parser;
use recipe_backend::domain::{AccountService, EmailAddress};
use recipe_backend::outbound::hashing::Argon2Hasher;
use recipe_backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselUserRepository,
};
use recipe_backend::settings::AppSettings;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `delete-user` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "delete-user",
    about = "Delete a user and everything they own",
    version
)]
struct CliArgs {
    /// Email address of the account to remove.
    #[arg(long, value_name = "email")]
    email: String,
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
    let email = EmailAddress::new(&args.email).map_err(|error| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid email: {error}"))
    })?;
    let settings = AppSettings::load_without_cli("delete-user").map_err(io::Error::other)?;
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
        .find_by_email(&email)
        .await
        .map_err(|error| io::Error::other(format!("look up user: {error}")))?
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no user {email}")))?;
    let deleted = accounts
        .delete_user(&user.id())
        .await
        .map_err(|error| io::Error::other(format!("delete user: {error}")))?;
    if !deleted {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no user {email}"),
        ));
    }

    println!("deleted user {email}");
    Ok(())
}
