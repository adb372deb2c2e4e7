//! Reconstruction of canonical section text from flat source rows.
//!
//! Each section is either stored as one self-contained parent row that
//! already embeds its lettered subpoints, or as an optional intro row plus
//! one row per subpoint. [`assemble`] folds both shapes into a single text
//! per canonical key.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::AssemblyError;
use crate::section::{child_letter, is_parent_code, resolve, SectionKey};

/// Any inline `(a)`-style marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INLINE_SUBPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([a-z]\)").expect("valid regex"));

/// A `(a) ` marker at the start of a child's content.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEADING_SUBPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\([a-z]\)\s+").expect("valid regex"));

/// One row of section content as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRow {
    /// Section code, e.g. `AnnexIV.2.c`.
    pub code: String,
    /// Row text.
    pub content: String,
    /// Explicit position within the parent section, if any.
    pub order_index: Option<i32>,
}

impl SectionRow {
    /// Create a new row.
    #[must_use]
    pub fn new(code: impl Into<String>, content: impl Into<String>, order_index: Option<i32>) -> Self {
        Self {
            code: code.into(),
            content: content.into(),
            order_index,
        }
    }
}

/// Canonical text for all nine sections.
///
/// Every key is always present; sections without rows hold `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledSections(BTreeMap<SectionKey, String>);

impl AssembledSections {
    /// Text for one section.
    #[must_use]
    pub fn get(&self, key: SectionKey) -> &str {
        self.0.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Iterate sections in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of sections with non-empty text.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.0.values().filter(|v| !v.is_empty()).count()
    }
}

/// Assemble the canonical text of every section from `rows`.
///
/// Rows whose code doesn't resolve to a canonical key are ignored. A
/// section whose parent row already carries inline `(x)` markers is taken
/// verbatim and its child rows are dropped; otherwise the parent intro is
/// followed by each child rendered as `(letter) content`, ordered by
/// `order_index` (nulls last), then letter, then full code. Paragraphs are
/// separated by a blank line.
///
/// # Errors
///
/// Returns [`AssemblyError::DuplicateParent`] when a section has more than
/// one parent row.
pub fn assemble(rows: &[SectionRow]) -> Result<AssembledSections, AssemblyError> {
    let mut buckets: BTreeMap<SectionKey, Vec<&SectionRow>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = resolve(&row.code) {
            buckets.entry(key).or_default().push(row);
        }
    }

    let mut out = BTreeMap::new();
    for key in SectionKey::all() {
        let text = match buckets.get(&key) {
            Some(bucket) => assemble_section(key, bucket)?,
            None => String::new(),
        };
        out.insert(key, text);
    }

    Ok(AssembledSections(out))
}

fn assemble_section(key: SectionKey, bucket: &[&SectionRow]) -> Result<String, AssemblyError> {
    let mut parent: Option<&SectionRow> = None;
    let mut children: Vec<&SectionRow> = Vec::new();

    for row in bucket {
        if is_parent_code(&row.code, key) {
            if let Some(first) = parent {
                return Err(AssemblyError::DuplicateParent {
                    key,
                    first: first.code.clone(),
                    second: row.code.clone(),
                });
            }
            parent = Some(row);
        } else {
            children.push(row);
        }
    }

    let intro = parent.map(|p| p.content.trim()).unwrap_or_default();

    if !intro.is_empty() && INLINE_SUBPOINT.is_match(intro) {
        if !children.is_empty() {
            tracing::debug!(
                section = %key,
                skipped = children.len(),
                "parent row embeds subpoints, ignoring child rows"
            );
        }
        return Ok(intro.to_string());
    }

    children.sort_by_cached_key(|row| {
        (
            row.order_index.is_none(),
            row.order_index.unwrap_or(0),
            child_letter(&row.code),
            row.code.clone(),
        )
    });

    let mut paragraphs: Vec<String> = Vec::with_capacity(children.len() + 1);
    if !intro.is_empty() {
        paragraphs.push(intro.to_string());
    }
    for row in children {
        let body = LEADING_SUBPOINT.replace(&row.content, "");
        let body = body.trim();
        let paragraph = match child_letter(&row.code) {
            Some(letter) => format!("({letter}) {body}"),
            None => body.to_string(),
        };
        if !paragraph.trim().is_empty() {
            paragraphs.push(paragraph);
        }
    }

    Ok(paragraphs.join("\n\n"))
}
