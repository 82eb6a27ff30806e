//! Shared setup for the Diesel adapter suites.
//!
//! Each suite gets its own embedded cluster and a freshly migrated database.
//! Set `SKIP_TEST_CLUSTER=1` to skip the suites where PostgreSQL cannot
//! start; otherwise a setup failure fails the test.
#![allow(dead_code, reason = "each suite uses a subset of these helpers")]

pub mod pg_embed;

use std::collections::BTreeSet;

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use recipe_backend::domain::ports::UserRepository;
use recipe_backend::domain::{
    AttributeId, Cost, EmailAddress, RecipeDraft, RecipeTitle, User, UserFlags, UserId, UserName,
};
use recipe_backend::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

/// A migrated database plus the runtime that drives its pool.
pub struct PgContext {
    pub pool: DbPool,
    pub database_url: String,
    pub runtime: Runtime,
    _cluster: TestCluster,
}

impl PgContext {
    /// Insert an ordinary user so owned rows satisfy their foreign keys.
    pub fn seed_user(&self, email: &str) -> UserId {
        let user = User::new(
            UserId::random(),
            EmailAddress::new(email).expect("valid email"),
            UserName::default(),
            None,
            UserFlags::default(),
        );
        let users = DieselUserRepository::new(self.pool.clone());
        self.runtime
            .block_on(users.insert(&user))
            .expect("seed user");
        user.id()
    }

    /// Row count of `table`, read outside Diesel.
    pub fn count(&self, table: &str) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query_one(format!("SELECT COUNT(*) FROM {table}").as_str(), &[])
            .unwrap_or_else(|err| panic!("count {table}: {}", format_postgres_error(&err)))
            .get(0)
    }
}

/// Start a cluster, recreate `database` and apply the embedded migrations.
pub fn setup_context(database: &str) -> Result<PgContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = pg_embed::test_cluster()?;
    reset_database(&cluster, database)?;
    let database_url = cluster.connection().database_url(database);
    runtime
        .block_on(run_pending_migrations(&database_url))
        .map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(PgContext {
        pool,
        database_url,
        runtime,
        _cluster: cluster,
    })
}

/// Drop and recreate `database`. `DROP DATABASE` must run outside a
/// transaction, so this uses a plain `postgres` client.
fn reset_database(cluster: &TestCluster, database: &str) -> Result<(), String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls)
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{database}\" WITH (FORCE)"))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{database}\""))
        .map_err(|err| format_postgres_error(&err))
}

/// Render a `postgres` error with its SQLSTATE and detail.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

fn skip_requested() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// `None` with a skip marker when `SKIP_TEST_CLUSTER` is set, else panic.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if skip_requested() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Draft titled `title` linking the given tags and ingredients.
pub fn draft(title: &str, tag_ids: &[AttributeId], ingredient_ids: &[AttributeId]) -> RecipeDraft {
    RecipeDraft {
        title: RecipeTitle::new(title).expect("valid title"),
        time_minutes: 15,
        cost: Cost::new(Decimal::new(525, 2)).expect("valid cost"),
        link: None,
        tag_ids: tag_ids.iter().copied().collect::<BTreeSet<_>>(),
        ingredient_ids: ingredient_ids.iter().copied().collect::<BTreeSet<_>>(),
    }
}
