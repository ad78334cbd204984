//! One polling run: watermark, search with key rotation, conditional inserts.
//!
//! YouTube orders `order=date` results newest first and a run asks for at
//! most [`SEARCH_PAGE_SIZE`] of them. When more videos than that were
//! published since the watermark, the oldest ones in the burst are not
//! returned and, once a newer video has moved the watermark past them, are
//! never fetched. Runs do not page through results to close that gap.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::IngestError;
use crate::services::key_rotation::KeyRotator;
use crate::services::youtube_search::{SearchItem, SearchRequest, VideoSearch, SEARCH_PAGE_SIZE};
use crate::store::VideoStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The search succeeded; `inserted` of the `fetched` items were new.
    Completed { fetched: usize, inserted: usize },
    /// A non-quota failure ended the run; the next run starts from the same watermark.
    Abandoned,
    /// Every configured key reported an exhausted quota.
    KeysExhausted,
}

pub struct IngestionTask {
    store: Arc<dyn VideoStore>,
    search: Arc<dyn VideoSearch>,
    keys: Arc<KeyRotator>,
    query: String,
}

/// `publishedAfter` value for a watermark: RFC 3339, UTC, whole seconds.
pub fn format_watermark(watermark: DateTime<Utc>) -> String {
    watermark.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl IngestionTask {
    pub fn new(
        store: Arc<dyn VideoStore>,
        search: Arc<dyn VideoSearch>,
        keys: Arc<KeyRotator>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            store,
            search,
            keys,
            query: query.into(),
        }
    }

    /// Runs once and contains every failure; errors are logged, never returned.
    #[tracing::instrument(name = "Fetch latest videos", skip(self), fields(query = %self.query))]
    pub async fn run_once(&self) -> RunOutcome {
        match self.try_run().await {
            Ok(outcome) => outcome,
            Err(IngestError::TransientApi { status, message }) => {
                tracing::error!("An unexpected HTTP error occurred: {} {}", status, message);
                RunOutcome::Abandoned
            }
            Err(e) => {
                tracing::error!("An unexpected error occurred: {:?}", e);
                RunOutcome::Abandoned
            }
        }
    }

    async fn try_run(&self) -> Result<RunOutcome, IngestError> {
        let published_after = format_watermark(self.store.latest_timestamp().await?);
        tracing::info!("Fetching videos published after: {}", published_after);

        let request = SearchRequest {
            query: &self.query,
            published_after: &published_after,
            max_results: SEARCH_PAGE_SIZE,
        };

        for attempt in 1..=self.keys.len() {
            let api_key = self.keys.current()?;

            match self.search.search(api_key, &request).await {
                Ok(items) => return self.save(items).await,
                Err(IngestError::QuotaExceeded { message, .. }) => {
                    tracing::error!(
                        attempt,
                        key_index = self.keys.current_index(),
                        "Quota exhausted on current API key ({}). Trying next key...",
                        message
                    );
                    self.keys.rotate()?;
                }
                Err(e) => return Err(e),
            }
        }

        if self.keys.is_empty() {
            return Err(IngestError::Configuration(
                "no YouTube API keys configured".to_string(),
            ));
        }

        tracing::error!(
            "All {} API keys hit their quota; retrying on the next run",
            self.keys.len()
        );
        Ok(RunOutcome::KeysExhausted)
    }

    async fn save(&self, items: Vec<SearchItem>) -> Result<RunOutcome, IngestError> {
        let fetched = items.len();
        let mut inserted = 0;

        for item in items {
            let video = match item.to_video() {
                Ok(video) => video,
                Err(e) => {
                    tracing::warn!("Skipping malformed search result: {}", e);
                    continue;
                }
            };

            if self.store.create_if_absent(video).await?.is_created() {
                inserted += 1;
            }
        }

        if inserted > 0 {
            tracing::info!("Successfully fetched and saved {} new videos.", inserted);
        } else {
            tracing::info!("No new videos found.");
        }

        Ok(RunOutcome::Completed { fetched, inserted })
    }
}
