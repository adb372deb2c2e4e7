pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod regulation;

pub use config::{StoreConfig, DEFAULT_REGULATION_REF};
pub use db::{create_lazy_pool, run_migrations};
pub use error::{Result, StoreError};
pub use models::{Regulation, RuleRecord};
pub use regulation::RuleStore;
