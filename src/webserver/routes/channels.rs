/// Channel endpoints
///
/// Reads go through the local cache; every mutation invalidates the
/// `"channels"` cache key so the next read loads fresh data.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::database::models::{ChannelCreateRequest, ChannelResponse, ChannelUpdateRequest};
use crate::errors::AppResult;
use crate::logger::{self, LogTag};
use crate::webserver::routes::CHANNELS_CACHE_KEY;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response, success_with};

/// Channels as a deserialized list, read through the cache.
///
/// The cached payload is the JSON-serialized channel list; the loader runs a
/// database query on miss, and near-expiry hits refresh in the background.
pub(crate) async fn load_channels(state: &AppState) -> AppResult<Vec<ChannelResponse>> {
    let db = state.db.clone();
    let payload = state
        .cache
        .get_with_auto_refresh(CHANNELS_CACHE_KEY, state.config.cache_ttl, move || {
            async move {
                logger::debug(
                    LogTag::Cache,
                    "channels missing from local cache, loading from database",
                );
                let channels = db.get_all_channels()?;
                Ok(serde_json::to_string(&channels)?)
            }
        })
        .await?;
    Ok(serde_json::from_str(&payload)?)
}

/// GET /api/channels
pub async fn get_channels(State(state): State<Arc<AppState>>) -> Response {
    match load_channels(&state).await {
        Ok(channels) => success_with("channels fetched", "channels", json!(channels)),
        Err(e) => {
            logger::error(LogTag::Http, &format!("failed to fetch channels: {}", e));
            error_response("channel data is temporarily unavailable")
        }
    }
}

/// POST /api/channels
pub async fn create_channel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChannelCreateRequest>,
) -> Response {
    if req.name.trim().is_empty() {
        return error_response("name must not be empty");
    }
    if let Err(e) = state.db.create_channel(&req) {
        return error_response(&e.to_string());
    }
    state.cache.delete(CHANNELS_CACHE_KEY);
    success_response("channel created")
}

/// PUT /api/channels/:id
pub async fn update_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ChannelUpdateRequest>,
) -> Response {
    if req.name.trim().is_empty() {
        return error_response("name must not be empty");
    }
    let req = ChannelUpdateRequest { id, ..req };
    if let Err(e) = state.db.update_channel(&req) {
        return error_response(&e.to_string());
    }
    state.cache.delete(CHANNELS_CACHE_KEY);
    success_response("channel updated")
}

/// DELETE /api/channels/:id
pub async fn delete_channel(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    if let Err(e) = state.db.delete_channel(id) {
        return error_response(&e.to_string());
    }
    state.cache.delete(CHANNELS_CACHE_KEY);
    success_response("channel deleted")
}
