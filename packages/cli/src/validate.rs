//! The `validate` command pipeline.
//!
//! A [`Document`] is read once and keeps both views of the input: the
//! coordinate-preserving tree used for diagnostics and the typed payload the
//! rule engine evaluates.

use std::path::Path;

use annexiv_engine::{
    build_report, resolve_positions, write_report, AnnexPolicy, Evaluation, ExpectedCounts,
    Payload, PayloadError, RuleEngine, SourceTree, Violation,
};

use crate::error::Result;

/// A user document loaded for validation.
#[derive(Debug)]
pub struct Document {
    uri: String,
    tree: Option<SourceTree>,
    payload: Payload,
}

impl Document {
    /// Read and parse a document from disk.
    ///
    /// The path is kept verbatim as the artifact URI of SARIF results.
    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::parse(&source, path.display().to_string())?)
    }

    /// Parse document text.
    ///
    /// A failing coordinate parse only disables source positions; a failing
    /// payload boundary check is an error.
    pub fn parse(source: &str, uri: impl Into<String>) -> std::result::Result<Self, PayloadError> {
        let uri = uri.into();
        let tree = match SourceTree::parse(source) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!(uri = %uri, error = %e, "source coordinates unavailable");
                None
            }
        };
        let payload = Payload::from_yaml_str(source)?;

        Ok(Self { uri, tree, payload })
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Evaluate the document with the default Annex IV policy.
    pub fn evaluate(&self, expected: Option<&ExpectedCounts>) -> Evaluation {
        RuleEngine::new(AnnexPolicy).evaluate(&self.payload, expected)
    }

    /// Write a SARIF report for `violations`.
    pub fn write_sarif(&self, violations: &[Violation], out: &Path) -> Result<()> {
        let positions = resolve_positions(violations, self.tree.as_ref());
        let report = build_report(violations, &positions, &self.uri);
        write_report(&report, out)?;
        tracing::debug!(path = %out.display(), results = violations.len(), "wrote SARIF report");
        Ok(())
    }
}

/// Evaluate document text in one step.
pub fn evaluate_document(
    source: &str,
    expected: Option<&ExpectedCounts>,
) -> std::result::Result<Evaluation, PayloadError> {
    Ok(Document::parse(source, "<memory>")?.evaluate(expected))
}
