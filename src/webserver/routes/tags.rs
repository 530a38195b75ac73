/// Tag endpoints
///
/// Same caching scheme as channels, keyed by `"tags"`.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::database::models::{TagCreateRequest, TagResponse};
use crate::errors::AppResult;
use crate::logger::{self, LogTag};
use crate::webserver::routes::TAGS_CACHE_KEY;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response, success_with};

/// Tags as a deserialized list, read through the cache.
pub(crate) async fn load_tags(state: &AppState) -> AppResult<Vec<TagResponse>> {
    let db = state.db.clone();
    let payload = state
        .cache
        .get_with_auto_refresh(TAGS_CACHE_KEY, state.config.cache_ttl, move || {
            async move {
                logger::debug(
                    LogTag::Cache,
                    "tags missing from local cache, loading from database",
                );
                let tags = db.list_tags()?;
                Ok(serde_json::to_string(&tags)?)
            }
        })
        .await?;
    Ok(serde_json::from_str(&payload)?)
}

/// GET /api/tags
pub async fn get_tags(State(state): State<Arc<AppState>>) -> Response {
    match load_tags(&state).await {
        Ok(tags) => success_with("tags fetched", "tags", json!(tags)),
        Err(e) => {
            logger::error(LogTag::Http, &format!("failed to fetch tags: {}", e));
            error_response("tag data is temporarily unavailable")
        }
    }
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagCreateRequest>,
) -> Response {
    if req.name.trim().is_empty() || req.channels.is_empty() {
        return error_response("tag name and channels must not be empty");
    }
    // Tag names are stored lowercase.
    let req = TagCreateRequest {
        name: req.name.to_lowercase(),
        channels: req.channels,
    };
    if let Err(e) = state.db.create_tag(&req) {
        return error_response(&e.to_string());
    }
    state.cache.delete(TAGS_CACHE_KEY);
    success_response("tag created")
}

/// DELETE /api/tags/:id
pub async fn delete_tag(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    if let Err(e) = state.db.delete_tag(id) {
        return error_response(&e.to_string());
    }
    state.cache.delete(TAGS_CACHE_KEY);
    success_response("tag deleted")
}
