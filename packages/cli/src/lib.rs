//! Annex IV CLI - validate technical documentation and assemble Annex IV scaffolds.
//!
//! The binary is a thin shell over [`validate`] and [`scaffold`]; both can
//! be driven directly as a library.
//!
//! # Example
//!
//! ```
//! use annexiv_cli::validate::evaluate_document;
//!
//! let evaluation = evaluate_document("risk_level: high\n", None).unwrap();
//! assert!(!evaluation.passed());
//! ```
//!
//! # Architecture
//!
//! - [`cli`]: Command-line interface
//! - [`validate`]: The validate command pipeline
//! - [`scaffold`]: YAML scaffold output
//! - [`store`]: Blocking access to the rule store
//! - [`error`]: Error types and Result alias

pub mod cli;
pub mod error;
pub mod scaffold;
pub mod store;
pub mod validate;

pub use error::{CliError, Result};
