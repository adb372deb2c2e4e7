//! Typed view of a user-authored Annex IV document.
//!
//! The raw YAML is checked once at the boundary: classification fields are
//! strictly typed, while section fields are kept leniently so that missing
//! or malformed sections surface as rule violations instead of parse errors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::PayloadError;
use crate::section::SectionKey;

/// Size class of the provider (Art. 11(1) simplified form for SMEs).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnterpriseSize {
    Sme,
    Mid,
    Large,
}

/// Risk classification of the AI system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    High,
    Limited,
    Minimal,
}

/// High-risk use case tags from Annex III.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UseCase {
    BiometricId,
    CriticalInfrastructure,
    EducationScoring,
    EmploymentScreening,
    EssentialServices,
    LawEnforcement,
    MigrationControl,
    JusticeDecision,
}

/// Value found under a section key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionField {
    /// A string value (possibly empty).
    Text(String),
    /// Present, but not a string.
    NotText(&'static str),
}

/// A validated Annex IV document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    sections: BTreeMap<SectionKey, SectionField>,
    pub enterprise_size: Option<EnterpriseSize>,
    pub risk_level: Option<RiskLevel>,
    pub use_cases: Vec<UseCase>,
    pub schema_version: Option<String>,
}

impl Payload {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, PayloadError> {
        if text.trim().is_empty() {
            return Self::from_value(&Value::Null);
        }
        let value: Value = serde_yaml_ng::from_str(text)?;
        Self::from_value(&value)
    }

    /// Validate an already parsed YAML value.
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        let empty = Mapping::new();
        let map = match value {
            Value::Null => &empty,
            Value::Mapping(m) => m,
            other => return Err(PayloadError::NotAMapping(kind_of(other))),
        };

        let mut sections = BTreeMap::new();
        for key in SectionKey::all() {
            let field = match map.get(key.as_str()) {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) => SectionField::Text(s.clone()),
                Some(other) => SectionField::NotText(kind_of(other)),
            };
            sections.insert(key, field);
        }

        Ok(Self {
            sections,
            enterprise_size: optional_choice(map, "enterprise_size")?,
            risk_level: optional_choice(map, "risk_level")?,
            use_cases: use_cases(map)?,
            schema_version: schema_version(map)?,
        })
    }

    /// Non-blank text of a section, if the field is a string.
    #[must_use]
    pub fn section(&self, key: SectionKey) -> Option<&str> {
        match self.sections.get(&key) {
            Some(SectionField::Text(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Raw field for a section, if present at all.
    #[must_use]
    pub fn section_field(&self, key: SectionKey) -> Option<&SectionField> {
        self.sections.get(&key)
    }

    /// Set a section's text.
    #[must_use]
    pub fn with_section(mut self, key: SectionKey, text: impl Into<String>) -> Self {
        self.sections.insert(key, SectionField::Text(text.into()));
        self
    }

    /// Set the risk level.
    #[must_use]
    pub fn with_risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    /// Set the enterprise size.
    #[must_use]
    pub fn with_enterprise_size(mut self, size: EnterpriseSize) -> Self {
        self.enterprise_size = Some(size);
        self
    }

    /// Set the declared use cases.
    #[must_use]
    pub fn with_use_cases(mut self, use_cases: impl IntoIterator<Item = UseCase>) -> Self {
        self.use_cases = use_cases.into_iter().collect();
        self
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        _ => "a tagged value",
    }
}

fn one_of<T: IntoEnumIterator + fmt::Display>() -> String {
    let names: Vec<String> = T::iter().map(|v| v.to_string()).collect();
    format!("one of {}", names.join(", "))
}

/// Read an optional vocabulary field; a blank string counts as unset.
fn optional_choice<T>(map: &Mapping, field: &'static str) -> Result<Option<T>, PayloadError>
where
    T: FromStr + IntoEnumIterator + fmt::Display,
{
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PayloadError::InvalidField {
                field,
                expected: one_of::<T>(),
            }),
        Some(_) => Err(PayloadError::InvalidField {
            field,
            expected: one_of::<T>(),
        }),
    }
}

fn use_cases(map: &Mapping) -> Result<Vec<UseCase>, PayloadError> {
    let items = match map.get("use_cases") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            return Err(PayloadError::InvalidField {
                field: "use_cases",
                expected: "a list of strings".to_string(),
            })
        }
    };

    let mut known = Vec::with_capacity(items.len());
    let mut unknown = Vec::new();
    for item in items {
        let Value::String(tag) = item else {
            return Err(PayloadError::InvalidField {
                field: "use_cases",
                expected: "a list of strings".to_string(),
            });
        };
        match tag.parse::<UseCase>() {
            Ok(use_case) => known.push(use_case),
            Err(_) => unknown.push(tag.clone()),
        }
    }

    if !unknown.is_empty() {
        let mut allowed: Vec<String> = UseCase::iter().map(|u| u.to_string()).collect();
        allowed.sort();
        return Err(PayloadError::UnknownUseCase { unknown, allowed });
    }
    Ok(known)
}

fn schema_version(map: &Mapping) -> Result<Option<String>, PayloadError> {
    match map.get("_schema_version") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(PayloadError::InvalidField {
            field: "_schema_version",
            expected: "a string".to_string(),
        }),
    }
}
