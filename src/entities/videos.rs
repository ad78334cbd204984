//! Video records as stored in the `videos` table and returned by `/videos`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

/// Outcome of a conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    Created(Video),
    Existing(Video),
}

impl Insertion {
    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Searchable form of a title. Stored alongside the title and applied to
/// search terms, so matching is case-insensitive for any script.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filter, order and window for a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoQuery {
    pub skip: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl Default for VideoQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            sort: SortOrder::Desc,
        }
    }
}

impl VideoQuery {
    /// `LIKE` pattern matched against the folded title. The term is folded
    /// the same way and its wildcards are escaped by `\`.
    pub fn title_pattern(&self) -> Option<String> {
        let search = self.search.as_deref()?.trim();
        if search.is_empty() {
            return None;
        }

        let search = fold_title(search);
        let mut pattern = String::with_capacity(search.len() + 2);
        pattern.push('%');
        for c in search.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}
