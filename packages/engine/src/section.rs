//! Canonical Annex IV section keys and section code resolution.
//!
//! Source rows are addressed by codes such as `AnnexIV.3` (a section
//! parent) or `AnnexIV.3.b` (a lettered subpoint of section 3). The numeric
//! index maps onto one of nine fixed canonical keys.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Prefix shared by every Annex IV section code.
pub const SECTION_PREFIX: &str = "AnnexIV";

/// Number of canonical sections.
pub const SECTION_COUNT: usize = 9;

/// Matches the leading `AnnexIV.<N>` part of any section code.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECTION_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^AnnexIV\.(\d+)").expect("valid regex"));

/// Matches an exact child code `AnnexIV.<N>.<letter>` with nothing after the letter.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHILD_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^AnnexIV\.(\d+)\.([a-z])$").expect("valid regex"));

/// The nine required sections of Annex IV technical documentation.
///
/// Declaration order is the source order (1..9) and drives `Ord`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SectionKey {
    SystemOverview,
    DevelopmentProcess,
    SystemMonitoring,
    PerformanceMetrics,
    RiskManagement,
    ChangesAndVersions,
    StandardsApplied,
    ComplianceDeclaration,
    PostMarketPlan,
}

impl SectionKey {
    /// All keys in source order.
    pub fn all() -> impl Iterator<Item = SectionKey> {
        Self::iter()
    }

    /// Look up the key for a 1-based source index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index == 0 {
            return None;
        }
        Self::iter().nth(index - 1)
    }

    /// 1-based source index of this key.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize + 1
    }

    /// The YAML key name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Code of the parent row for this section, e.g. `AnnexIV.3`.
    #[must_use]
    pub fn parent_code(self) -> String {
        format!("{SECTION_PREFIX}.{}", self.index())
    }

    /// Official Annex IV heading of the section.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SystemOverview => "A general description of the AI system",
            Self::DevelopmentProcess => {
                "A detailed description of the elements of the AI system and of the process for its development"
            }
            Self::SystemMonitoring => {
                "Detailed information about the monitoring, functioning and control of the AI system"
            }
            Self::PerformanceMetrics => {
                "A description of the appropriateness of the performance metrics for the specific AI system"
            }
            Self::RiskManagement => {
                "A detailed description of the risk management system in accordance with Article 9"
            }
            Self::ChangesAndVersions => {
                "A description of relevant changes made by the provider to the system through its lifecycle"
            }
            Self::StandardsApplied => "A list of the harmonised standards applied in full or in part",
            Self::ComplianceDeclaration => {
                "A copy of the EU declaration of conformity referred to in Article 47"
            }
            Self::PostMarketPlan => {
                "A detailed description of the system in place to evaluate the AI system performance in the post-market phase"
            }
        }
    }
}

/// Resolve a section code to its canonical key.
///
/// Codes that don't start with `AnnexIV.<N>` (case-insensitive), or whose
/// `N` falls outside 1..=9, resolve to `None`.
///
/// # Examples
/// ```
/// use annexiv_engine::section::{resolve, SectionKey};
///
/// assert_eq!(resolve("AnnexIV.1"), Some(SectionKey::SystemOverview));
/// assert_eq!(resolve("annexiv.3.b"), Some(SectionKey::SystemMonitoring));
/// assert_eq!(resolve("AnnexIV.10"), None);
/// assert_eq!(resolve("AnnexIII.1"), None);
/// ```
#[must_use]
pub fn resolve(code: &str) -> Option<SectionKey> {
    let caps = SECTION_CODE_PATTERN.captures(code)?;
    let index: usize = caps.get(1)?.as_str().parse().ok()?;
    SectionKey::from_index(index)
}

/// Extract the subpoint letter from an exact child code.
///
/// Returns the lowercased letter for `AnnexIV.<N>.<letter>`, and `None`
/// for parent codes, deeper codes and anything malformed.
///
/// # Examples
/// ```
/// use annexiv_engine::section::child_letter;
///
/// assert_eq!(child_letter("AnnexIV.3.a"), Some('a'));
/// assert_eq!(child_letter("AnnexIV.3"), None);
/// assert_eq!(child_letter("AnnexIV.3.a.extra"), None);
/// ```
#[must_use]
pub fn child_letter(code: &str) -> Option<char> {
    child_parts(code).map(|(_, letter)| letter)
}

/// Split an exact child code into its numeric index and letter.
pub(crate) fn child_parts(code: &str) -> Option<(usize, char)> {
    let caps = CHILD_CODE_PATTERN.captures(code)?;
    let index = caps.get(1)?.as_str().parse().ok()?;
    let letter = caps.get(2)?.as_str().chars().next()?.to_ascii_lowercase();
    Some((index, letter))
}

/// Whether `code` is exactly the parent code of `key` (case-insensitive).
#[must_use]
pub fn is_parent_code(code: &str, key: SectionKey) -> bool {
    code.eq_ignore_ascii_case(&key.parent_code())
}
