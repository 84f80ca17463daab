//! Record Store: pluggable source of stored CRM records.
//!
//! `AppState` holds an `Arc<dyn RecordStore>`: `PgRecordStore` when a
//! database is configured, `FixtureRecordStore` otherwise.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::record::StoredRecord;
use crate::records::fixtures::demo_records;

/// Records are returned most recently contacted first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// At most `limit` records.
    async fn recent(&self, limit: i64) -> Result<Vec<StoredRecord>, AppError>;

    /// Every record contacted at or after `since`, or all records when `None`.
    async fn contacted_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredRecord>, AppError>;

    /// "postgres" | "fixtures", reported by /health.
    fn backend(&self) -> &'static str;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn recent(&self, limit: i64) -> Result<Vec<StoredRecord>, AppError> {
        let rows = sqlx::query_as::<_, StoredRecord>(
            "SELECT * FROM crm_records ORDER BY last_contact_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn contacted_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredRecord>, AppError> {
        let rows = sqlx::query_as::<_, StoredRecord>(
            r#"
            SELECT * FROM crm_records
            WHERE $1::timestamptz IS NULL OR last_contact_at >= $1
            ORDER BY last_contact_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// In-memory demo records.
///
/// Dates are kept relative to the day the store was built and shifted forward
/// on every read, so "days since contact" and follow-up state never drift with
/// server uptime.
pub struct FixtureRecordStore {
    records: Vec<StoredRecord>,
    anchor: NaiveDate,
}

impl FixtureRecordStore {
    pub fn new(records: Vec<StoredRecord>) -> Self {
        Self::anchored(records, Utc::now().date_naive())
    }

    /// Records whose dates were computed relative to `anchor`.
    pub fn anchored(mut records: Vec<StoredRecord>, anchor: NaiveDate) -> Self {
        records.sort_by(|a, b| b.last_contact_at.cmp(&a.last_contact_at));
        Self { records, anchor }
    }

    /// The demo pipeline anchored at the current time.
    pub fn demo() -> Self {
        Self::new(demo_records(Utc::now()))
    }

    /// Snapshot with every date moved forward by the days elapsed since `anchor`.
    fn current(&self) -> Vec<StoredRecord> {
        let shift = Duration::days((Utc::now().date_naive() - self.anchor).num_days());
        self.records
            .iter()
            .cloned()
            .map(|mut record| {
                record.last_contact_at += shift;
                record.created_at += shift;
                record.follow_up_date = record.follow_up_date.map(|date| date + shift);
                record
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for FixtureRecordStore {
    async fn recent(&self, limit: i64) -> Result<Vec<StoredRecord>, AppError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let mut records = self.current();
        records.truncate(limit);
        Ok(records)
    }

    async fn contacted_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StoredRecord>, AppError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|r| since.map_or(true, |s| r.last_contact_at >= s))
            .collect())
    }

    fn backend(&self) -> &'static str {
        "fixtures"
    }
}
