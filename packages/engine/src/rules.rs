//! Rule engine for filled Annex IV documents.
//!
//! Rules run in a fixed order so that output is stable:
//!
//! 1. required-field rule, per section in canonical order;
//! 2. structural sufficiency, per section, only when the source defines
//!    an expected subpoint count and the section passed rule 1;
//! 3. the injected policy, whose deny and warn lists are appended as-is.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::counts::ExpectedCounts;
use crate::payload::{Payload, SectionField};
use crate::policy::{AnnexPolicy, Finding, PolicyEvaluator};
use crate::section::SectionKey;

/// Rule id suffix for a missing section.
pub const REQUIRED_SUFFIX: &str = "_required";

/// Rule id suffix for a section with too few top-level subpoints.
pub const SUBPOINTS_SUFFIX: &str = "_subpoints_insufficient";

/// A `(x)` marker inside a line, with the whitespace in front of it.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INLINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[ \t]+\(([a-z])\)").expect("valid regex"));

/// Text ending in a noun that introduces a cross-reference, as in "point (b)".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REFERENCE_NOUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:points?|paragraphs?|subparagraphs?|letters?)\s*$").expect("valid regex")
});

/// Text following a cross-reference marker, as in "(b) of Article 3".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REFERENCE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:of|thereof)\b").expect("valid regex"));

/// A top-level `(a) ` marker at the very start of a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TOP_LEVEL_SUBPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(([a-z])\)\s+").expect("valid regex"));

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Blocks the run.
    Deny,
    /// Reported only.
    Warn,
}

/// A rule hit with its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub msg: String,
    pub severity: Severity,
}

impl Violation {
    pub fn deny(rule: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            msg: msg.into(),
            severity: Severity::Deny,
        }
    }

    pub fn warn(rule: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            msg: msg.into(),
            severity: Severity::Warn,
        }
    }

    /// Payload key this violation points at.
    #[must_use]
    pub fn offending_key(&self) -> &str {
        offending_key(&self.rule)
    }
}

/// Recover the payload key from a rule id by stripping a known suffix.
///
/// Ids without a known suffix are returned unchanged.
#[must_use]
pub fn offending_key(rule: &str) -> &str {
    rule.strip_suffix(SUBPOINTS_SUFFIX)
        .or_else(|| rule.strip_suffix(REQUIRED_SUFFIX))
        .unwrap_or(rule)
}

/// Ordered result of evaluating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    pub warnings: Vec<Violation>,
}

impl Evaluation {
    /// True when no deny violation was produced.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Evaluates documents against built-in rules plus a policy.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine<P = AnnexPolicy> {
    policy: P,
}

impl<P: PolicyEvaluator> RuleEngine<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Evaluate `payload`, optionally checking subpoint counts against `expected`.
    pub fn evaluate(&self, payload: &Payload, expected: Option<&ExpectedCounts>) -> Evaluation {
        let mut evaluation = Evaluation::default();

        let mut present = Vec::new();
        for key in SectionKey::all() {
            match required_violation(payload, key) {
                Some(v) => evaluation.violations.push(v),
                None => present.push(key),
            }
        }

        if let Some(expected) = expected {
            for key in present {
                let want = expected.get(key);
                if want == 0 {
                    continue;
                }
                let found = payload.section(key).map_or(0, count_top_level_subpoints);
                if found < want {
                    evaluation.violations.push(Violation::deny(
                        format!("{key}{SUBPOINTS_SUFFIX}"),
                        format!(
                            "Section '{key}' lists {found} top-level subpoint(s) but Annex IV defines {want}"
                        ),
                    ));
                }
            }
        }

        let outcome = self.policy.evaluate(payload);
        let into_deny = |f: Finding| Violation::deny(f.rule, f.msg);
        let into_warn = |f: Finding| Violation::warn(f.rule, f.msg);
        evaluation.violations.extend(outcome.deny.into_iter().map(into_deny));
        evaluation.warnings.extend(outcome.warn.into_iter().map(into_warn));

        tracing::debug!(
            violations = evaluation.violations.len(),
            warnings = evaluation.warnings.len(),
            "evaluated payload"
        );
        evaluation
    }
}

fn required_violation(payload: &Payload, key: SectionKey) -> Option<Violation> {
    if payload.section(key).is_some() {
        return None;
    }
    let rule = format!("{key}{REQUIRED_SUFFIX}");
    let msg = match payload.section_field(key) {
        Some(SectionField::NotText(kind)) => {
            format!("Section '{key}' ({}) must be text, found {kind}", key.title())
        }
        Some(SectionField::Text(_)) => {
            format!("Section '{key}' ({}) must not be empty", key.title())
        }
        None => format!("Section '{key}' ({}) is required", key.title()),
    };
    Some(Violation::deny(rule, msg))
}

/// Undo flattening that YAML quoting or folding applied to list text.
///
/// Literal `\n` escapes become real line breaks. An inline marker is moved
/// back to a line of its own only when it carries the next letter of the
/// top-level sequence, so `(i)` items and references such as
/// "point (b) of Article 3" stay inside the body they belong to.
#[must_use]
pub fn normalize_subpoint_text(text: &str) -> String {
    let text = text
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\t", " ")
        .replace("\r\n", "\n");

    let mut next = 'a';
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        unfold_line(line, &mut next, &mut out);
    }
    out
}

fn unfold_line(line: &str, next: &mut char, out: &mut String) {
    if let Some(letter) = leading_letter(line) {
        *next = successor(letter);
    }

    let mut copied = 0;
    for caps in INLINE_MARKER.captures_iter(line) {
        let (Some(whole), Some(letter)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let letter = letter.as_str().chars().next().map(|c| c.to_ascii_lowercase());
        let before = &line[..whole.start()];
        let after = &line[whole.end()..];

        let followed_by_space = after.chars().next().is_some_and(char::is_whitespace);
        if before.is_empty()
            || !followed_by_space
            || letter != Some(*next)
            || REFERENCE_NOUN.is_match(before)
            || REFERENCE_TAIL.is_match(after)
        {
            continue;
        }

        // Marker starts after the whitespace run
        let marker_start = whole.start() + whole.as_str().len() - "(x)".len();
        out.push_str(&line[copied..whole.start()]);
        out.push('\n');
        copied = marker_start;
        *next = successor(*next);
    }
    out.push_str(&line[copied..]);
}

fn leading_letter(line: &str) -> Option<char> {
    TOP_LEVEL_SUBPOINT
        .captures(line)?
        .get(1)?
        .as_str()
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
}

fn successor(letter: char) -> char {
    char::from(letter as u8 + 1)
}

/// Count distinct top-level `(x)` subpoints in a section's text.
///
/// Only unindented markers count; markers nested in a subpoint body are
/// indented and therefore ignored.
#[must_use]
pub fn count_top_level_subpoints(text: &str) -> usize {
    let normalized = normalize_subpoint_text(text);
    normalized
        .lines()
        .filter_map(|line| TOP_LEVEL_SUBPOINT.captures(line))
        .filter_map(|caps| caps.get(1)?.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
        .collect::<BTreeSet<char>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{NoPolicy, PolicyOutcome};
    use pretty_assertions::assert_eq;

    fn complete_payload() -> Payload {
        SectionKey::all().fold(Payload::default(), |p, key| {
            p.with_section(key, format!("Text for {key}"))
        })
    }

    fn rule_ids(list: &[Violation]) -> Vec<&str> {
        list.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn test_missing_section_is_required() {
        let payload = Payload::from_yaml_str("development_process: text\n").unwrap();
        let eval = RuleEngine::new(NoPolicy).evaluate(&payload, None);
        assert_eq!(eval.violations.len(), 8);
        assert_eq!(eval.violations[0].rule, "system_overview_required");
        assert_eq!(eval.violations[0].severity, Severity::Deny);
        assert!(!eval.passed());
    }

    #[test]
    fn test_non_string_and_empty_sections() {
        let payload = complete_payload();
        let yaml = "system_overview: [a, b]\nrisk_management: ''\n";
        let partial = Payload::from_yaml_str(yaml).unwrap();
        let eval = RuleEngine::new(NoPolicy).evaluate(&partial, None);
        assert!(eval.violations[0].msg.contains("must be text, found a sequence"));
        let rm = eval
            .violations
            .iter()
            .find(|v| v.rule == "risk_management_required")
            .unwrap();
        assert!(rm.msg.contains("must not be empty"));

        assert!(RuleEngine::new(NoPolicy).evaluate(&payload, None).passed());
    }

    #[test]
    fn test_insufficient_subpoints() {
        let mut expected = ExpectedCounts::default();
        expected.insert(SectionKey::SystemOverview, 2);

        let one = complete_payload().with_section(SectionKey::SystemOverview, "(a) only one");
        let eval = RuleEngine::new(NoPolicy).evaluate(&one, Some(&expected));
        assert_eq!(rule_ids(&eval.violations), vec!["system_overview_subpoints_insufficient"]);

        let two = complete_payload().with_section(SectionKey::SystemOverview, "(a) first\n(b) second");
        let eval = RuleEngine::new(NoPolicy).evaluate(&two, Some(&expected));
        assert!(eval.passed());
    }

    #[test]
    fn test_structural_rule_skipped_when_required_fired() {
        let mut expected = ExpectedCounts::default();
        expected.insert(SectionKey::SystemOverview, 3);
        let payload = Payload::default();
        let eval = RuleEngine::new(NoPolicy).evaluate(&payload, Some(&expected));
        assert!(!rule_ids(&eval.violations).contains(&"system_overview_subpoints_insufficient"));
    }

    #[test]
    fn test_no_expectation_means_no_structural_rule() {
        let payload = complete_payload();
        let eval = RuleEngine::new(NoPolicy).evaluate(&payload, Some(&ExpectedCounts::default()));
        assert!(eval.passed());
    }

    #[test]
    fn test_policy_findings_are_appended_in_order() {
        let policy = |_: &Payload| PolicyOutcome {
            deny: vec![Finding::new("z_rule", "z"), Finding::new("a_rule", "a")],
            warn: vec![Finding::new("w_rule", "w")],
        };
        let payload = complete_payload().with_section(SectionKey::PostMarketPlan, "");
        let eval = RuleEngine::new(policy).evaluate(&payload, None);
        assert_eq!(
            rule_ids(&eval.violations),
            vec!["post_market_plan_required", "z_rule", "a_rule"]
        );
        assert_eq!(rule_ids(&eval.warnings), vec!["w_rule"]);
        assert_eq!(eval.warnings[0].severity, Severity::Warn);
    }

    #[test]
    fn test_warnings_alone_pass() {
        let payload = complete_payload();
        let policy = |_: &Payload| PolicyOutcome {
            deny: Vec::new(),
            warn: vec![Finding::new("advice", "consider this")],
        };
        let eval = RuleEngine::new(policy).evaluate(&payload, None);
        assert!(eval.passed());
        assert_eq!(eval.warnings.len(), 1);
    }

    #[test]
    fn test_count_folded_and_escaped_markers() {
        assert_eq!(count_top_level_subpoints("intro (a) one (b) two (c) three"), 3);
        assert_eq!(count_top_level_subpoints("(a) one\\n(b) two"), 2);
        assert_eq!(count_top_level_subpoints("x\t(a) one\t(b) two"), 2);
        assert_eq!(count_top_level_subpoints("(a) (b) empty first"), 1);
        assert_eq!(count_top_level_subpoints("no markers at all"), 0);
    }

    #[test]
    fn test_count_ignores_nested_and_repeated_markers() {
        let text = "(a) first\n  (i) nested\n  (b) nested too\n(b) second\n(B) again";
        assert_eq!(count_top_level_subpoints(text), 2);
    }

    #[test]
    fn test_count_ignores_inline_markers_inside_a_body() {
        assert_eq!(
            count_top_level_subpoints("(a) the purpose, covering (i) scoring and more"),
            1
        );
        assert_eq!(
            count_top_level_subpoints("(a) inputs as referred to in point (b) of Article 3"),
            1
        );
        assert_eq!(
            count_top_level_subpoints("(a) data as in points (a) and (b) of Annex III"),
            1
        );
        // The sequence continues after an inline body marker
        assert_eq!(
            count_top_level_subpoints("(a) scope (i) users (b) design (c) tests"),
            3
        );
    }

    #[test]
    fn test_normalize_keeps_body_markers_in_place() {
        assert_eq!(
            normalize_subpoint_text("intro (a) one, see point (b) of Art. 5 (b) two"),
            "intro\n(a) one, see point (b) of Art. 5\n(b) two"
        );
    }

    #[test]
    fn test_body_marker_does_not_satisfy_expected_count() {
        let mut expected = ExpectedCounts::default();
        expected.insert(SectionKey::SystemOverview, 2);
        let payload = complete_payload().with_section(
            SectionKey::SystemOverview,
            "(a) the purpose, covering (i) scoring and more",
        );

        let eval = RuleEngine::new(NoPolicy).evaluate(&payload, Some(&expected));
        assert_eq!(
            rule_ids(&eval.violations),
            vec!["system_overview_subpoints_insufficient"]
        );
    }

    #[test]
    fn test_offending_key() {
        assert_eq!(offending_key("system_overview_required"), "system_overview");
        assert_eq!(
            offending_key("system_overview_subpoints_insufficient"),
            "system_overview"
        );
        assert_eq!(offending_key("risk_level_not_high"), "risk_level_not_high");
    }
}
