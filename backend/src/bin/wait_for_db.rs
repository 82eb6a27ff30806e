//! Block until PostgreSQL accepts connections.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::time::Duration;

use clap::Parser;
use recipe_backend::outbound::persistence::{PgProbe, wait_until_available};
use recipe_backend::settings::AppSettings;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `wait-for-db` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wait-for-db",
    about = "Wait until the database accepts connections",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `RECIPE_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Seconds between attempts. Falls back to the configured interval.
    #[arg(long, value_name = "seconds")]
    interval: Option<u64>,
    /// Give up after this many attempts instead of waiting forever.
    #[arg(long = "max-attempts", value_name = "count")]
    max_attempts: Option<u32>,
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
    let settings = AppSettings::load_without_cli("wait-for-db").map_err(io::Error::other)?;
    let database_url = settings
        .database_url_or(args.database_url.as_deref())
        .map_err(io::Error::other)?;
    let interval = args
        .interval
        .map_or_else(|| settings.wait_interval(), Duration::from_secs);

    println!("Waiting for database...");
    wait_until_available(&PgProbe::new(database_url), interval, args.max_attempts)
        .await
        .map_err(io::Error::other)?;
    println!("Database available!");
    Ok(())
}
