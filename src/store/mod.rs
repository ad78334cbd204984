//! Persistence for video records.
//!
//! [`VideoStore`] is implemented for PostgreSQL (production) and SQLite
//! (single-file deployments and tests). Both create-if-absent implementations
//! are a single `INSERT .. ON CONFLICT DO NOTHING`, so concurrent writers can
//! never produce two rows for one `video_id`. The SQL text itself lives in
//! `queries` and is shared by both.

#[cfg(test)]
pub(crate) mod conformance;
pub mod postgres;
mod queries;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::entities::videos::{Insertion, Video, VideoQuery};
use crate::errors::AppError;

pub use postgres::PgVideoStore;
pub use sqlite::SqliteVideoStore;

/// Watermark used when nothing has been stored yet.
pub const BOOTSTRAP_LOOKBACK_MINUTES: i64 = 5;

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Creates the `videos` table and its indexes if they are missing.
    async fn init_schema(&self) -> Result<(), AppError>;

    /// `published_at` of the newest stored video, if any.
    async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>, AppError>;

    async fn create_if_absent(&self, video: Video) -> Result<Insertion, AppError>;

    async fn list(&self, query: &VideoQuery) -> Result<Vec<Video>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;

    /// Ingestion watermark: the newest `published_at`, or a few minutes ago
    /// for an empty store.
    async fn latest_timestamp(&self) -> Result<DateTime<Utc>, AppError> {
        Ok(self.latest_published_at().await?.unwrap_or_else(|| {
            Utc::now() - Duration::minutes(BOOTSTRAP_LOOKBACK_MINUTES)
        }))
    }
}

/// Splits an embedded schema file into executable statements.
pub(crate) fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statements_skip_comment_only_chunks() {
        let statements = schema_statements("-- header\nCREATE TABLE a (x INT);\n-- trailing\n");
        assert_eq!(statements, vec!["-- header\nCREATE TABLE a (x INT)"]);
    }
}
