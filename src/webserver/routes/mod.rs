/// API route registration
pub mod channels;
pub mod tags;
pub mod title;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::webserver::middleware;
use crate::webserver::state::AppState;

/// Cache key for the channel list payload
pub(crate) const CHANNELS_CACHE_KEY: &str = "channels";
/// Cache key for the tag list payload
pub(crate) const TAGS_CACHE_KEY: &str = "tags";

/// Assemble the full router with middleware applied.
///
/// Layer order matters: the IP gate runs outermost so blocked clients never
/// reach a handler, and request logging sees the final status code.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(from_fn(middleware::log_requests))
        .layer(from_fn(middleware::request_id))
        .layer(from_fn_with_state(state.clone(), middleware::ip_restriction))
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-title", post(title::generate_title))
        .route("/channels", get(channels::get_channels))
        .route("/channels", post(channels::create_channel))
        .route("/channels/:id", put(channels::update_channel))
        .route("/channels/:id", delete(channels::delete_channel))
        .route("/tags", get(tags::get_tags))
        .route("/tags", post(tags::create_tag))
        .route("/tags/:id", delete(tags::delete_tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::cache::LocalCache;
    use crate::config::{AppConfig, IpRestrictionMode};
    use crate::database::Database;

    fn test_state(config: AppConfig) -> Arc<AppState> {
        let db = Database::open_in_memory().unwrap();
        let cache = LocalCache::new(Duration::from_secs(600));
        Arc::new(AppState::new(config, db, cache))
    }

    fn test_router(state: Arc<AppState>) -> Router {
        create_router(state)
    }

    fn request(method: Method, path: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        let mut request = match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        // axum::serve normally injects this; tests drive the router directly.
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_channels_empty() {
        let app = test_router(test_state(AppConfig::default()));

        let response = app
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["channels"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_channel_invalidates_cache() {
        let state = test_state(AppConfig::default());
        let app = test_router(state.clone());

        // Prime the cache with the empty list.
        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["channels"], serde_json::json!([]));

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/channels",
                Some(serde_json::json!({"name": "gaming", "default_title": "plays"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "success");

        // The cached list was invalidated, so the new channel shows up.
        let response = app
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["channels"][0]["name"], "gaming");
        assert_eq!(body["channels"][0]["default_title"], "plays");
    }

    #[tokio::test]
    async fn test_create_channel_rejects_empty_name() {
        let app = test_router(test_state(AppConfig::default()));

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/channels",
                Some(serde_json::json!({"name": "  "})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "name must not be empty");
    }

    #[tokio::test]
    async fn test_update_and_delete_channel() {
        let state = test_state(AppConfig::default());
        let app = test_router(state.clone());

        app.clone()
            .oneshot(request(
                Method::POST,
                "/api/channels",
                Some(serde_json::json!({"name": "tech"})),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        let id = body_json(response).await["channels"][0]["id"]
            .as_i64()
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                &format!("/api/channels/{}", id),
                Some(serde_json::json!({"name": "technology"})),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "success");

        let response = app
            .clone()
            .oneshot(request(
                Method::DELETE,
                &format!("/api/channels/{}", id),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "success");

        let response = app
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["channels"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_duplicate_tag_reports_conflict() {
        let state = test_state(AppConfig::default());
        let app = test_router(state.clone());

        app.clone()
            .oneshot(request(
                Method::POST,
                "/api/channels",
                Some(serde_json::json!({"name": "music"})),
            ))
            .await
            .unwrap();

        let tag = serde_json::json!({"name": "Rock", "channels": [1]});
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/api/tags", Some(tag.clone())))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "success");

        // Stored lowercase, so the retry collides regardless of case.
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/api/tags", Some(tag)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "tag name already exists");

        let response = app
            .oneshot(request(Method::GET, "/api/tags", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["tags"].as_array().unwrap().len(), 1);
        assert_eq!(body["tags"][0]["name"], "rock");
    }

    #[tokio::test]
    async fn test_generate_title_flow() {
        let state = test_state(AppConfig::default());
        let app = test_router(state.clone());

        app.clone()
            .oneshot(request(
                Method::POST,
                "/api/channels",
                Some(serde_json::json!({"name": "gaming"})),
            ))
            .await
            .unwrap();
        app.clone()
            .oneshot(request(
                Method::POST,
                "/api/tags",
                Some(serde_json::json!({"name": "speedrun", "channels": [1]})),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/generate-title",
                Some(serde_json::json!({"theme": "World record attempt", "channel": 1})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        let title = body["title"].as_str().unwrap();
        assert!(title.starts_with("World record attempt"));
        assert!(title.contains("#speedrun"));
        assert!(title.chars().count() <= 100);
    }

    #[tokio::test]
    async fn test_generate_title_unknown_channel() {
        let app = test_router(test_state(AppConfig::default()));

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/generate-title",
                Some(serde_json::json!({"theme": "anything", "channel": 42})),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "channel not found");
    }

    #[tokio::test]
    async fn test_blacklisted_ip_is_rejected() {
        let config = AppConfig {
            ip_blacklist: vec!["127.0.0.1".to_string()],
            ..AppConfig::default()
        };
        let app = test_router(test_state(config));

        let response = app
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["message"], "insufficient IP permission");
    }

    #[tokio::test]
    async fn test_whitelist_allows_listed_ip() {
        let config = AppConfig {
            ip_restriction_mode: IpRestrictionMode::Whitelist,
            ip_whitelist: vec!["127.0.0.1".to_string()],
            ..AppConfig::default()
        };
        let app = test_router(test_state(config));

        let response = app
            .oneshot(request(Method::GET, "/api/channels", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = test_router(test_state(AppConfig::default()));

        let response = app
            .oneshot(request(Method::GET, "/api/tags", None))
            .await
            .unwrap();
        assert!(response
            .headers()
            .contains_key(crate::webserver::middleware::REQUEST_ID_HEADER));
    }
}
