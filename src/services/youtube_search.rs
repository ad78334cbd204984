//! YouTube Data API `search.list` client.
//!
//! Costs 100 quota units per call, which is why the ingestion task rotates
//! through several API keys.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::entities::videos::Video;
use crate::errors::IngestError;

/// Upper bound YouTube accepts for `maxResults` on search.list is 50; the
/// ingestion task asks for 25 per run.
pub const SEARCH_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// RFC 3339 instant, e.g. `2024-05-01T12:00:00Z`.
    pub published_after: &'a str,
    pub max_results: u32,
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Runs one search with `api_key`. A spent quota is reported as
    /// [`IngestError::QuotaExceeded`] so the caller can switch keys.
    async fn search(
        &self,
        api_key: &SecretString,
        request: &SearchRequest<'_>,
    ) -> Result<Vec<SearchItem>, IngestError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub published_at: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl SearchItem {
    pub fn to_video(&self) -> anyhow::Result<Video> {
        let video_id = self
            .id
            .video_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("search result of kind {:?} has no videoId", self.id.kind))?;
        let snippet = self
            .snippet
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("video {} has no snippet", video_id))?;

        let published_at = DateTime::parse_from_rfc3339(&snippet.published_at)
            .map_err(|e| anyhow::anyhow!("video {} has invalid publishedAt: {}", video_id, e))?
            .with_timezone(&Utc);

        let description = Some(snippet.description.clone()).filter(|d| !d.is_empty());
        let thumbnail_url = snippet
            .thumbnails
            .as_ref()
            .and_then(|t| t.default.as_ref())
            .map(|t| t.url.clone());

        Ok(Video {
            video_id,
            title: snippet.title.clone(),
            description,
            published_at,
            thumbnail_url,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Human readable summary of a YouTube error body, falling back to the raw text.
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .iter()
                .find_map(|e| e.reason.clone())
                .unwrap_or_else(|| "unknown".to_string());
            let message = envelope.error.message.unwrap_or_default();
            format!("{reason}: {message}")
        }
        Err(_) => body.chars().take(200).collect(),
    }
}

#[derive(Clone, Debug)]
pub struct YoutubeSearchClient {
    http_client: Client,
    search_url: Url,
}

impl YoutubeSearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let search_url = Url::parse(&format!("{}/search", base_url.trim_end_matches('/')))?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            search_url,
        })
    }
}

#[async_trait]
impl VideoSearch for YoutubeSearchClient {
    #[tracing::instrument(
        name = "Search YouTube videos",
        skip(self, api_key, request),
        fields(query = %request.query, published_after = %request.published_after)
    )]
    async fn search(
        &self,
        api_key: &SecretString,
        request: &SearchRequest<'_>,
    ) -> Result<Vec<SearchItem>, IngestError> {
        let max_results = request.max_results.to_string();

        let response = self
            .http_client
            .get(self.search_url.clone())
            .query(&[
                ("part", "snippet"),
                ("q", request.query),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
                ("publishedAfter", request.published_after),
                ("key", api_key.expose_secret().as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_error_body(&body);

            return Err(if status == StatusCode::FORBIDDEN {
                IngestError::QuotaExceeded {
                    status: status.as_u16(),
                    message,
                }
            } else {
                tracing::error!("YouTube API error: {} {}", status, message);
                IngestError::TransientApi {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let data: SearchListResponse = response.json().await?;
        tracing::debug!(
            "Received {} search results (more available: {})",
            data.items.len(),
            data.next_page_token.is_some()
        );

        Ok(data.items)
    }
}
