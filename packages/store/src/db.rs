use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::StoreConfig;
use crate::error::Result;

/// Build a pool without opening a connection; the first query connects.
///
/// Stays synchronous so a [`RuleStore`](crate::RuleStore) can be created
/// before any query runs. Connection failures surface on first use.
pub fn create_lazy_pool(config: &StoreConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.database_url)?;

    Ok(pool)
}

/// Create the `regulations` and `rules` tables if they are missing.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
