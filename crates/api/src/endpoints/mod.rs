//! API endpoints.

mod comments;
mod contents;
mod friendships;
mod health;
mod playlists;
mod reactions;
mod taxonomy;
mod users;

use axum::Router;
use serde::Deserialize;
use vv_db::content::{ContentKind, ContentRef};

use crate::middleware::AppState;

/// `{"contentType": "video", "contentId": "..."}` as it appears in request bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTarget {
    pub content_type: ContentKind,
    pub content_id: String,
}

impl ContentTarget {
    #[must_use]
    pub fn to_ref(&self) -> ContentRef {
        ContentRef::new(self.content_type, self.content_id.clone())
    }
}

const fn default_limit() -> u64 {
    10
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/contents", contents::router())
        .nest("/reactions", reactions::router())
        .nest("/comments", comments::router())
        .nest("/playlists", playlists::router())
        .nest("/users", users::router())
        .nest("/taxonomy", taxonomy::router())
        .nest("/friendships", friendships::router())
}
