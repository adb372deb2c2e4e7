//! YAML scaffold output.
//!
//! The scaffold is what `assemble` writes: every canonical section with its
//! assembled text, followed by the classification fields a user fills in.
//! It loads back as a valid payload.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use annexiv_engine::{AssembledSections, EnterpriseSize, UseCase};

use crate::error::Result;

/// Default output file of the `assemble` command.
pub const DEFAULT_SCAFFOLD_PATH: &str = "annex_schema.yaml";

/// Trailing classification block of the scaffold.
#[derive(Debug, Serialize)]
struct ScaffoldMeta<'a> {
    enterprise_size: EnterpriseSize,
    risk_level: &'a str,
    use_cases: Vec<UseCase>,
    #[serde(rename = "_schema_version")]
    schema_version: &'a str,
}

/// Schema version written into the scaffold.
///
/// Falls back to today's date as `YYYYMMDD` when the store has no version.
pub fn scaffold_version(stored: &str) -> String {
    let stored = stored.trim();
    if stored.is_empty() {
        chrono::Local::now().format("%Y%m%d").to_string()
    } else {
        stored.to_string()
    }
}

/// Render the scaffold as YAML text.
///
/// Sections are emitted in canonical order, one mapping entry each,
/// separated by a blank line.
pub fn render_scaffold(sections: &AssembledSections, schema_version: &str) -> Result<String> {
    let mut blocks = Vec::new();
    for (key, text) in sections.iter() {
        let entry: BTreeMap<&str, &str> = BTreeMap::from([(key.as_str(), text)]);
        blocks.push(serde_yaml_ng::to_string(&entry)?);
    }

    let meta = ScaffoldMeta {
        enterprise_size: EnterpriseSize::Mid,
        risk_level: "",
        use_cases: Vec::new(),
        schema_version,
    };

    let mut out = blocks.join("\n");
    out.push_str(&serde_yaml_ng::to_string(&meta)?);
    Ok(out)
}

/// Render and write the scaffold to `path`.
pub fn save_scaffold(sections: &AssembledSections, schema_version: &str, path: &Path) -> Result<()> {
    let yaml = render_scaffold(sections, schema_version)?;
    std::fs::write(path, yaml)?;
    Ok(())
}
