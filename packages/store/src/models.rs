use annexiv_engine::SectionRow;
use serde::{Deserialize, Serialize};

/// A stored document family, e.g. the AI Act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Regulation {
    pub id: String,
    pub external_ref: String,
    pub version: String,
}

/// One row of the `rules` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RuleRecord {
    pub id: String,
    pub regulation_id: String,
    pub section_code: String,
    pub title: Option<String>,
    pub content: String,
    pub order_index: Option<i32>,
}

impl From<RuleRecord> for SectionRow {
    fn from(record: RuleRecord) -> Self {
        SectionRow::new(record.section_code, record.content, record.order_index)
    }
}
