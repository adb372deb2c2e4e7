//! Blocking access to the rule store for the synchronous CLI.

use std::future::Future;

use annexiv_store::{RuleStore, StoreConfig};

use crate::error::{CliError, Result};

/// Build the store configuration, preferring an explicit URL over the
/// environment.
pub fn store_config(db_url: Option<&str>) -> Result<StoreConfig> {
    let config = match db_url {
        Some(url) => StoreConfig::new(url),
        None => StoreConfig::from_env()?,
    };
    Ok(config)
}

/// Run `op` against a freshly opened store and close it afterwards.
///
/// The pool is created inside a current-thread runtime and closed on both
/// the success and the error path.
pub fn with_store<T, F, Fut>(db_url: Option<&str>, op: F) -> Result<T>
where
    F: FnOnce(RuleStore) -> Fut,
    Fut: Future<Output = (RuleStore, annexiv_store::Result<T>)>,
{
    let config = store_config(db_url)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let store = RuleStore::connect(&config)?;
        let (store, result) = op(store).await;
        store.close().await;
        Ok::<T, CliError>(result?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        let config = store_config(Some("postgres://localhost/annex")).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/annex");
        assert_eq!(config.max_connections, 1);
    }
}
