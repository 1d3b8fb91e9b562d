//! Embedded single-page dashboard

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// GET / - status page polling the JSON API
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
