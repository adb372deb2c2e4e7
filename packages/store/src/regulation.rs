use annexiv_engine::{
    assemble, expected_counts, AssembledSections, ExpectedCounts, SectionRow, SECTION_PREFIX,
};
use sqlx::{PgConnection, PgPool};

use crate::config::StoreConfig;
use crate::db::create_lazy_pool;
use crate::error::{Result, StoreError};
use crate::models::{Regulation, RuleRecord};

/// Read access to regulations and their section rows.
///
/// Owns its connection pool. Each operation checks out one connection for
/// its duration and returns it before completing; [`RuleStore::close`]
/// shuts the pool down.
#[derive(Debug, Clone)]
pub struct RuleStore {
    pool: PgPool,
}

impl RuleStore {
    /// Create a store whose pool connects on first use.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            pool: create_lazy_pool(config)?,
        })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Look up a regulation by its external reference (CELEX number).
    pub async fn find_regulation(&self, external_ref: &str) -> Result<Regulation> {
        let mut conn = self.pool.acquire().await?;
        fetch_regulation(&mut conn, external_ref).await
    }

    /// Annex IV rows of a regulation, ordered by `order_index` (nulls last)
    /// and then section code.
    pub async fn section_rows(&self, regulation: &Regulation) -> Result<Vec<RuleRecord>> {
        let mut conn = self.pool.acquire().await?;
        fetch_rows(&mut conn, &regulation.id).await
    }

    /// Assemble the canonical section text of a regulation.
    ///
    /// Fails with [`StoreError::RegulationNotFound`] before any assembly
    /// happens when the reference is unknown.
    pub async fn load_annex(&self, external_ref: &str) -> Result<AssembledSections> {
        let mut conn = self.pool.acquire().await?;
        let regulation = fetch_regulation(&mut conn, external_ref).await?;
        let records = fetch_rows(&mut conn, &regulation.id).await?;
        drop(conn);

        let rows: Vec<SectionRow> = records.into_iter().map(SectionRow::from).collect();
        let sections = assemble(&rows)?;
        tracing::info!(
            external_ref,
            rows = rows.len(),
            filled = sections.filled_count(),
            "assembled annex"
        );
        Ok(sections)
    }

    /// Expected number of top-level subpoints per section.
    pub async fn expected_top_counts(&self, external_ref: &str) -> Result<ExpectedCounts> {
        let mut conn = self.pool.acquire().await?;
        let regulation = fetch_regulation(&mut conn, external_ref).await?;
        let records = fetch_rows(&mut conn, &regulation.id).await?;

        Ok(expected_counts(records.iter().map(|r| r.section_code.as_str())))
    }

    /// Version string stored for a regulation.
    pub async fn schema_version(&self, external_ref: &str) -> Result<String> {
        Ok(self.find_regulation(external_ref).await?.version)
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

async fn fetch_regulation(conn: &mut PgConnection, external_ref: &str) -> Result<Regulation> {
    let regulation = sqlx::query_as::<_, Regulation>(
        r#"SELECT id, external_ref, version FROM regulations WHERE external_ref = $1"#,
    )
    .bind(external_ref)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| StoreError::RegulationNotFound(external_ref.to_string()))?;

    Ok(regulation)
}

async fn fetch_rows(conn: &mut PgConnection, regulation_id: &str) -> Result<Vec<RuleRecord>> {
    let records = sqlx::query_as::<_, RuleRecord>(
        r#"
        SELECT id, regulation_id, section_code, title, content, order_index
        FROM rules
        WHERE regulation_id = $1 AND section_code ILIKE $2
        ORDER BY order_index ASC NULLS LAST, section_code COLLATE "C" ASC
        "#,
    )
    .bind(regulation_id)
    .bind(format!("{SECTION_PREFIX}%"))
    .fetch_all(&mut *conn)
    .await?;

    tracing::debug!(regulation_id, rows = records.len(), "fetched section rows");
    Ok(records)
}
