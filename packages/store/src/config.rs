use crate::error::{Result, StoreError};

/// Default CELEX number of Regulation (EU) 2024/1689 (the AI Act).
pub const DEFAULT_REGULATION_REF: &str = "32024R1689";

/// Connection settings for a [`RuleStore`](crate::RuleStore).
///
/// Every store operation holds exactly one pooled connection and the CLI
/// runs operations one after another, so a single connection is the
/// default. Raise it only when several operations share one store
/// concurrently.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    /// Read `DATABASE_URL` (required) and `DATABASE_MAX_CONNECTIONS`
    /// (default 1).
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Config("DATABASE_URL not set".into()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 1,
        }
    }

    /// Set the pool size; values below 1 are raised to 1.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}
