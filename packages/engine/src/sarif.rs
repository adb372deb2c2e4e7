//! SARIF 2.1.0 diagnostics for deny violations.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::rules::Violation;
use crate::source::{SourcePosition, SourceTree};

/// SARIF schema URI.
pub const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

/// SARIF version string.
pub const SARIF_VERSION: &str = "2.1.0";

/// Tool name written into every run.
pub const TOOL_NAME: &str = "annexiv";

/// Project page linked from the tool driver.
pub const TOOL_INFORMATION_URI: &str = "https://artificialintelligenceact.eu/annex/4/";

/// Top-level SARIF log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarifLog {
    pub version: &'static str,
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: &'static str,
    pub version: &'static str,
    pub information_uri: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub level: &'static str,
    pub rule_id: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    pub start_column: usize,
}

impl From<SourcePosition> for SarifRegion {
    fn from(pos: SourcePosition) -> Self {
        Self {
            start_line: pos.line,
            start_column: pos.column,
        }
    }
}

/// Resolve the source position of every violation's offending key.
///
/// Violations whose key can't be found, or all of them when `tree` is
/// `None`, are simply left out of the map.
#[must_use]
pub fn resolve_positions(
    violations: &[Violation],
    tree: Option<&SourceTree>,
) -> BTreeMap<String, SourcePosition> {
    let Some(tree) = tree else {
        return BTreeMap::new();
    };
    violations
        .iter()
        .filter_map(|v| {
            let position = tree.locate(v.offending_key());
            if position.is_none() {
                tracing::debug!(rule = %v.rule, "no source position for rule");
            }
            position.map(|p| (v.rule.clone(), p))
        })
        .collect()
}

/// Build a SARIF log with one error result per violation.
///
/// Rules without a resolved position point at line 1, column 1.
#[must_use]
pub fn build_report(
    violations: &[Violation],
    positions: &BTreeMap<String, SourcePosition>,
    source_path: &str,
) -> SarifLog {
    let results = violations
        .iter()
        .map(|v| {
            let position = match positions.get(&v.rule) {
                Some(p) => *p,
                None => SourcePosition::START,
            };
            SarifResult {
                level: "error",
                rule_id: v.rule.clone(),
                message: SarifMessage { text: v.msg.clone() },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: source_path.to_string(),
                        },
                        region: position.into(),
                    },
                }],
            }
        })
        .collect();

    SarifLog {
        version: SARIF_VERSION,
        schema: SARIF_SCHEMA,
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME,
                    version: env!("CARGO_PKG_VERSION"),
                    information_uri: TOOL_INFORMATION_URI,
                },
            },
            results,
        }],
    }
}

/// Write a SARIF log as pretty-printed JSON.
pub fn write_report(log: &SarifLog, out: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    std::fs::write(out, json)?;
    Ok(())
}
