use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::entities::videos::{fold_title, Insertion, Video, VideoQuery};
use crate::errors::AppError;
use crate::store::{queries, schema_statements, VideoStore};

const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

#[derive(Clone, Debug)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(name = "Connect to PostgreSQL", skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(url)
            .await?;

        tracing::info!("Connected to PostgreSQL");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn init_schema(&self) -> Result<(), AppError> {
        for statement in schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let latest = sqlx::query_scalar::<_, DateTime<Utc>>(queries::LATEST_PUBLISHED_AT)
            .fetch_optional(&self.pool)
            .await?;

        Ok(latest)
    }

    #[tracing::instrument(name = "Create video if absent", skip(self, video), fields(video_id = %video.video_id))]
    async fn create_if_absent(&self, video: Video) -> Result<Insertion, AppError> {
        let created = sqlx::query_as::<_, Video>(queries::INSERT_IF_ABSENT)
            .bind(&video.video_id)
            .bind(&video.title)
            .bind(fold_title(&video.title))
            .bind(&video.description)
            .bind(video.published_at)
            .bind(&video.thumbnail_url)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(created) = created {
            return Ok(Insertion::Created(created));
        }

        let existing = sqlx::query_as::<_, Video>(queries::SELECT_BY_ID)
            .bind(&video.video_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Insertion::Existing(existing))
    }

    async fn list(&self, query: &VideoQuery) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<_, Video>(queries::list(query.sort))
            .bind(query.title_pattern())
            .bind(i64::from(query.limit))
            .bind(i64::from(query.skip))
            .fetch_all(&self.pool)
            .await?;

        Ok(videos)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query(queries::PING).execute(&self.pool).await?;
        Ok(())
    }
}
