/// Video title generation endpoint
use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::logger::{self, LogTag};
use crate::title::{compose_title, TITLE_MAX_CHARS};
use crate::webserver::routes::channels::load_channels;
use crate::webserver::routes::tags::load_tags;
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_with};

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub theme: String,
    pub channel: i64,
}

/// POST /api/generate-title
///
/// Builds a title from the request theme plus a random selection of the
/// channel's tags, capped at the title character limit.
pub async fn generate_title(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TitleRequest>,
) -> Response {
    if req.theme.trim().is_empty() {
        return error_response("theme must not be empty");
    }
    if req.theme.chars().count() > TITLE_MAX_CHARS {
        return error_response("theme exceeds the title length limit");
    }

    let channels = match load_channels(&state).await {
        Ok(channels) => channels,
        Err(e) => {
            logger::error(LogTag::Http, &format!("failed to fetch channels: {}", e));
            return error_response("channel data is temporarily unavailable");
        }
    };
    let channel = match channels.iter().find(|c| c.id == req.channel) {
        Some(channel) => channel,
        None => return error_response("channel not found"),
    };

    let tags = match load_tags(&state).await {
        Ok(tags) => tags,
        Err(e) => {
            logger::error(LogTag::Http, &format!("failed to fetch tags: {}", e));
            return error_response("tag data is temporarily unavailable");
        }
    };
    let tag_names: Vec<String> = tags
        .into_iter()
        .filter(|t| channel.tags.contains(&t.id))
        .map(|t| t.name)
        .collect();

    let title = compose_title(req.theme.trim(), tag_names);
    success_with("title generated", "title", json!(title))
}
