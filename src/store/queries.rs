//! SQL text shared by the PostgreSQL and SQLite stores.
//!
//! Parameters are written `$N`, which both drivers accept. Title search runs
//! against `title_folded`, a Unicode-lowercased copy of `title` written on
//! insert, so matching does not depend on either engine's collation rules.

use crate::entities::videos::SortOrder;

pub(crate) const LATEST_PUBLISHED_AT: &str =
    "SELECT published_at FROM videos ORDER BY published_at DESC LIMIT 1";

/// Binds: video_id, title, title_folded, description, published_at, thumbnail_url.
pub(crate) const INSERT_IF_ABSENT: &str = r#"INSERT INTO videos (video_id, title, title_folded, description, published_at, thumbnail_url)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (video_id) DO NOTHING
RETURNING video_id, title, description, published_at, thumbnail_url"#;

/// Binds: video_id.
pub(crate) const SELECT_BY_ID: &str = r#"SELECT video_id, title, description, published_at, thumbnail_url
FROM videos WHERE video_id = $1"#;

pub(crate) const PING: &str = "SELECT 1";

/// Binds: title pattern (nullable), limit, offset.
const LIST_ASC: &str = r#"SELECT video_id, title, description, published_at, thumbnail_url
FROM videos
WHERE ($1 IS NULL OR title_folded LIKE $1 ESCAPE '\')
ORDER BY published_at ASC, video_id ASC
LIMIT $2 OFFSET $3"#;

const LIST_DESC: &str = r#"SELECT video_id, title, description, published_at, thumbnail_url
FROM videos
WHERE ($1 IS NULL OR title_folded LIKE $1 ESCAPE '\')
ORDER BY published_at DESC, video_id DESC
LIMIT $2 OFFSET $3"#;

pub(crate) fn list(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Asc => LIST_ASC,
        SortOrder::Desc => LIST_DESC,
    }
}
