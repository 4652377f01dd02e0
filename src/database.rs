use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
pub use sqlx::Error as DbError;
pub use sqlx::SqlitePool as Pool;

/// Build the SQLite pool and bring the schema up to date
pub async fn init_sqlite_connection(database_url: &str) -> anyhow::Result<Pool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database url {}", database_url))?
        .foreign_keys(true);

    // An in-memory database only lives as long as its connection
    let in_memory = database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Could not connect to the database")?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Run the embedded migrations
pub async fn migrate(pool: &Pool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Could not run the migrations")
}
