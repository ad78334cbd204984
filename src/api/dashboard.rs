//! Server-rendered dashboard. The page starts with the first page of results
//! and then pages, filters and refreshes itself through `GET /videos`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use crate::api::videos::query_params;
use crate::entities::videos::{SortOrder, VideoQuery, DEFAULT_PAGE_SIZE};
use crate::errors::AppError;
use crate::InnerState;

const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.html");

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

#[tracing::instrument(name = "Render dashboard", skip(inner))]
pub async fn dashboard(
    State(inner): State<InnerState>,
    params: Result<Query<DashboardParams>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let params = query_params(params)?;
    let query = VideoQuery {
        search: params.search.filter(|s| !s.trim().is_empty()),
        sort: params.sort.unwrap_or_default(),
        ..VideoQuery::default()
    };

    let videos = inner.store.list(&query).await?;
    let initial_videos = serde_json::to_string(&videos).map_err(anyhow::Error::from)?;
    let search = query.search.clone().unwrap_or_default();
    let search_json = serde_json::to_string(&search).map_err(anyhow::Error::from)?;

    let page = render(
        DASHBOARD_TEMPLATE,
        &[
            ("search_query", escape_html(&inner.search_query)),
            ("search", escape_html(&search)),
            ("search_json", escape_script(&search_json)),
            ("sort", query.sort.as_str().to_string()),
            ("page_size", DEFAULT_PAGE_SIZE.to_string()),
            ("initial_videos", escape_script(&initial_videos)),
        ],
    );

    Ok(Html(page))
}

/// Substitutes `{{name}}` placeholders in one pass, so substituted values are
/// never scanned for placeholders themselves. Unknown names are left as is.
fn render(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Keeps JSON embedded in a `<script>` element from closing it early.
fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}
