//! End-to-end tests for the engine pipeline.
//!
//! Rows are assembled and counted, a partially filled document is
//! evaluated against the counts, and violations are mapped back onto the
//! document's source coordinates in a SARIF report.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use annexiv_engine::{
    assemble, build_report, expected_counts, resolve_positions, AnnexPolicy, Payload, RuleEngine,
    SectionKey, SectionRow, SourceTree,
};

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Source rows as they would come out of the store.
fn source_rows() -> Vec<SectionRow> {
    vec![
        SectionRow::new("AnnexIV.1", "A general description of the AI system including:", None),
        SectionRow::new("AnnexIV.1.a", "its intended purpose", Some(1)),
        SectionRow::new("AnnexIV.1.b", "(b) how the AI system interacts with hardware", Some(2)),
        SectionRow::new(
            "AnnexIV.2",
            "A detailed description including: (a) methods (b) design (c) architecture",
            None,
        ),
        SectionRow::new("AnnexIV.2.a", "methods", None),
        SectionRow::new("AnnexIV.2.b", "design", None),
        SectionRow::new("AnnexIV.2.c", "architecture", None),
        SectionRow::new("AnnexIV.2.c.i", "nested detail", None),
        SectionRow::new("AnnexIV.8", "A copy of the EU declaration of conformity", None),
    ]
}

#[test]
fn test_assembled_text() {
    let sections = assemble(&source_rows()).unwrap();

    assert_eq!(
        sections.get(SectionKey::SystemOverview),
        "A general description of the AI system including:\n\n\
         (a) its intended purpose\n\n\
         (b) how the AI system interacts with hardware"
    );
    assert_eq!(
        sections.get(SectionKey::DevelopmentProcess),
        "A detailed description including: (a) methods (b) design (c) architecture"
    );
    assert_eq!(
        sections.get(SectionKey::ComplianceDeclaration),
        "A copy of the EU declaration of conformity"
    );
    assert_eq!(sections.get(SectionKey::RiskManagement), "");
}

#[test]
fn test_expected_counts_from_rows() {
    let rows = source_rows();
    let counts = expected_counts(rows.iter().map(|r| r.code.as_str()));

    assert_eq!(counts.get(SectionKey::SystemOverview), 2);
    assert_eq!(counts.get(SectionKey::DevelopmentProcess), 3);
    assert_eq!(counts.get(SectionKey::ComplianceDeclaration), 0);
}

#[test]
fn test_partial_document_violations_and_report() {
    let rows = source_rows();
    let counts = expected_counts(rows.iter().map(|r| r.code.as_str()));

    let source = load_fixture("annex_partial.yaml");
    let payload = Payload::from_yaml_str(&source).unwrap();
    let evaluation = RuleEngine::new(AnnexPolicy).evaluate(&payload, Some(&counts));

    let rules: Vec<&str> = evaluation.violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "risk_management_required",
            "system_overview_subpoints_insufficient",
        ]
    );
    assert!(evaluation.warnings.is_empty());
    assert!(!evaluation.passed());

    let tree = SourceTree::parse(&source).ok();
    let positions = resolve_positions(&evaluation.violations, tree.as_ref());
    let report = build_report(&evaluation.violations, &positions, "annex_partial.yaml");

    let regions: Vec<(usize, usize)> = report.runs[0]
        .results
        .iter()
        .map(|r| {
            let region = &r.locations[0].physical_location.region;
            (region.start_line, region.start_column)
        })
        .collect();
    assert_eq!(regions, vec![(21, 5), (2, 1)]);
}

#[test]
fn test_assembled_text_satisfies_its_own_counts() {
    let rows = source_rows();
    let counts = expected_counts(rows.iter().map(|r| r.code.as_str()));
    let sections = assemble(&rows).unwrap();

    let payload = sections.iter().fold(
        Payload::default().with_risk_level(annexiv_engine::RiskLevel::Limited),
        |p, (key, text)| {
            let text = if text.is_empty() { "n/a" } else { text };
            p.with_section(key, text)
        },
    );
    let evaluation = RuleEngine::new(AnnexPolicy).evaluate(&payload, Some(&counts));

    assert!(evaluation.passed(), "{:?}", evaluation.violations);
    assert_eq!(evaluation.warnings[0].rule, "risk_level_not_high");
}
