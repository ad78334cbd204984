use std::sync::Arc;

use crate::errors::AppError;
use crate::store::{PgVideoStore, SqliteVideoStore, VideoStore};

/// Connects to the store named by `database_url` and makes sure the schema exists.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<Arc<dyn VideoStore>, AppError> {
    let store: Arc<dyn VideoStore> = if database_url.starts_with("sqlite:") {
        Arc::new(SqliteVideoStore::connect(database_url, max_connections).await?)
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Arc::new(PgVideoStore::connect(database_url, max_connections).await?)
    } else {
        return Err(AppError::Validation(format!(
            "unsupported database URL scheme in {:?}",
            database_url.split(':').next().unwrap_or_default()
        )));
    };

    store.init_schema().await?;
    tracing::info!("Video store schema ready");
    Ok(store)
}
