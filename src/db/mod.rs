pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use queries::categories::Category;
pub use queries::questions::Question;

use sqlx::Error;

/// Failures surfaced by the store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Persistence(#[from] Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub async fn establish_connection(path: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?.create_if_missing(true);
    SqlitePool::connect_with(options).await
}

// every connection to `sqlite::memory:` opens its own database, so the pool
// is pinned to a single connection that never expires
pub async fn connect_in_memory() -> Result<SqlitePool, Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
