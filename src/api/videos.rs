use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::entities::videos::{SortOrder, Video, VideoQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::AppError;
use crate::InnerState;

#[derive(Debug, Default, Deserialize)]
pub struct VideoListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

impl From<VideoListParams> for VideoQuery {
    fn from(params: VideoListParams) -> Self {
        VideoQuery {
            skip: params.skip.unwrap_or(0),
            limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
            search: params.search.filter(|s| !s.trim().is_empty()),
            sort: params.sort.unwrap_or_default(),
        }
    }
}

/// Unwraps query parameters, turning a malformed query string into a 400.
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[tracing::instrument(name = "List videos", skip(inner))]
pub async fn list_videos(
    State(inner): State<InnerState>,
    params: Result<Query<VideoListParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, AppError> {
    let query = VideoQuery::from(query_params(params)?);
    let videos = inner.store.list(&query).await?;

    tracing::debug!("Returning {} videos", videos.len());
    Ok(Json(videos))
}
