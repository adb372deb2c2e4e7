//! Pluggable policy rules evaluated after the built-in checks.
//!
//! A policy is any pure function from a validated [`Payload`] to ordered
//! deny and warn findings. [`AnnexPolicy`] is the default set used by the
//! CLI; [`NoPolicy`] disables external rules entirely.

use serde::{Deserialize, Serialize};

use crate::payload::{EnterpriseSize, Payload, RiskLevel};

/// A single rule hit reported by a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: String,
    pub msg: String,
}

impl Finding {
    pub fn new(rule: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            msg: msg.into(),
        }
    }
}

/// Ordered findings produced by one policy run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// Blocking findings.
    pub deny: Vec<Finding>,
    /// Advisory findings.
    pub warn: Vec<Finding>,
}

/// Evaluates policy rules over a validated payload.
pub trait PolicyEvaluator {
    fn evaluate(&self, payload: &Payload) -> PolicyOutcome;
}

impl<F> PolicyEvaluator for F
where
    F: Fn(&Payload) -> PolicyOutcome,
{
    fn evaluate(&self, payload: &Payload) -> PolicyOutcome {
        self(payload)
    }
}

/// Policy without rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPolicy;

impl PolicyEvaluator for NoPolicy {
    fn evaluate(&self, _payload: &Payload) -> PolicyOutcome {
        PolicyOutcome::default()
    }
}

/// Default Annex IV classification rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnexPolicy;

impl PolicyEvaluator for AnnexPolicy {
    fn evaluate(&self, payload: &Payload) -> PolicyOutcome {
        let mut outcome = PolicyOutcome::default();

        match payload.risk_level {
            None => outcome.deny.push(Finding::new(
                "risk_level_required",
                "risk_level must be one of high, limited, minimal",
            )),
            Some(RiskLevel::High) if payload.use_cases.is_empty() => {
                outcome.deny.push(Finding::new(
                    "use_cases_required",
                    "High-risk systems must declare at least one Annex III use case",
                ));
            }
            Some(level @ (RiskLevel::Limited | RiskLevel::Minimal)) => {
                outcome.warn.push(Finding::new(
                    "risk_level_not_high",
                    format!(
                        "Annex IV documentation is only mandatory for high-risk systems (risk_level: {level})"
                    ),
                ));
            }
            Some(RiskLevel::High) => {}
        }

        if payload.enterprise_size == Some(EnterpriseSize::Sme) {
            outcome.warn.push(Finding::new(
                "enterprise_size_sme",
                "SMEs may provide the technical documentation in the simplified form (Art. 11(1))",
            ));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::UseCase;
    use pretty_assertions::assert_eq;

    fn rules(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule.as_str()).collect()
    }

    #[test]
    fn test_missing_risk_level_is_denied() {
        let outcome = AnnexPolicy.evaluate(&Payload::default());
        assert_eq!(rules(&outcome.deny), vec!["risk_level_required"]);
        assert!(outcome.warn.is_empty());
    }

    #[test]
    fn test_high_risk_requires_use_cases() {
        let payload = Payload::default().with_risk_level(RiskLevel::High);
        assert_eq!(
            rules(&AnnexPolicy.evaluate(&payload).deny),
            vec!["use_cases_required"]
        );

        let payload = payload.with_use_cases([UseCase::EmploymentScreening]);
        assert_eq!(AnnexPolicy.evaluate(&payload), PolicyOutcome::default());
    }

    #[test]
    fn test_warnings_keep_order() {
        let payload = Payload::default()
            .with_risk_level(RiskLevel::Minimal)
            .with_enterprise_size(EnterpriseSize::Sme);
        let outcome = AnnexPolicy.evaluate(&payload);
        assert!(outcome.deny.is_empty());
        assert_eq!(
            rules(&outcome.warn),
            vec!["risk_level_not_high", "enterprise_size_sme"]
        );
        assert!(outcome.warn[0].msg.contains("minimal"));
    }

    #[test]
    fn test_closure_is_a_policy() {
        let policy = |_: &Payload| PolicyOutcome {
            deny: vec![Finding::new("custom", "always")],
            warn: Vec::new(),
        };
        assert_eq!(rules(&policy.evaluate(&Payload::default()).deny), vec!["custom"]);
        assert_eq!(NoPolicy.evaluate(&Payload::default()), PolicyOutcome::default());
    }
}
