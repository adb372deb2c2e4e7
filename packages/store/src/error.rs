use thiserror::Error;

use annexiv_engine::AssemblyError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("regulation not found: {0}")]
    RegulationNotFound(String),

    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
