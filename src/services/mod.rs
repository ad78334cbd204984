//! Background ingestion of YouTube search results.

pub mod ingestion;
pub mod key_rotation;
pub mod scheduler;
pub mod youtube_search;
