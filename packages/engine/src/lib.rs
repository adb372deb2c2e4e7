//! Annex IV engine - assemble, validate and report on EU AI Act technical documentation.
//!
//! This crate holds the pure parts of the pipeline: no I/O happens here
//! apart from writing a finished SARIF report.
//!
//! # Example
//!
//! ```
//! use annexiv_engine::{assemble, expected_counts, NoPolicy, Payload, RuleEngine, SectionRow};
//!
//! let rows = vec![
//!     SectionRow::new("AnnexIV.1.a", "its intended purpose", Some(0)),
//!     SectionRow::new("AnnexIV.1.b", "how it interacts with hardware", Some(1)),
//! ];
//! let sections = assemble(&rows).unwrap();
//! assert!(sections.get(annexiv_engine::SectionKey::SystemOverview).starts_with("(a)"));
//!
//! let expected = expected_counts(rows.iter().map(|r| r.code.as_str()));
//! let payload = Payload::from_yaml_str("system_overview: '(a) purpose'\n").unwrap();
//! let evaluation = RuleEngine::new(NoPolicy).evaluate(&payload, Some(&expected));
//! assert!(!evaluation.passed());
//! ```
//!
//! # Architecture
//!
//! - [`section`]: canonical section keys and section code resolution
//! - [`assembly`]: canonical text from flat source rows
//! - [`counts`]: expected top-level subpoints per section
//! - [`payload`]: typed boundary for user documents
//! - [`policy`]: pluggable policy rules
//! - [`rules`]: the rule engine
//! - [`source`]: coordinate-preserving parse and key lookup
//! - [`sarif`]: SARIF diagnostics report
//! - [`error`]: error types

pub mod assembly;
pub mod counts;
pub mod error;
pub mod payload;
pub mod policy;
pub mod rules;
pub mod sarif;
pub mod section;
pub mod source;

pub use assembly::{assemble, AssembledSections, SectionRow};
pub use counts::{expected_counts, ExpectedCounts};
pub use error::{AssemblyError, EngineError, PayloadError, Result, SourceError};
pub use payload::{EnterpriseSize, Payload, RiskLevel, UseCase};
pub use policy::{AnnexPolicy, Finding, NoPolicy, PolicyEvaluator, PolicyOutcome};
pub use rules::{Evaluation, RuleEngine, Severity, Violation};
pub use sarif::{build_report, resolve_positions, write_report, SarifLog};
pub use section::{child_letter, resolve, SectionKey, SECTION_PREFIX};
pub use source::{SourcePosition, SourceTree};
