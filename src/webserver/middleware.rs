/// Webserver middleware
///
/// Request ID tagging, IP restriction gating and request logging.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::config::IpRestrictionMode;
use crate::logger::{self, LogTag};
use crate::webserver::{state::AppState, utils::forbidden_response};

/// Response header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Attach a UUID to the request extensions and the response headers.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Reject requests according to the configured IP restriction mode.
pub async fn ip_restriction(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = addr.ip().to_string();
    let blocked = match state.config.ip_restriction_mode {
        IpRestrictionMode::Blacklist => state.config.ip_blacklist.iter().any(|b| b == &ip),
        IpRestrictionMode::Whitelist => !state.config.ip_whitelist.iter().any(|w| w == &ip),
    };

    if blocked {
        logger::warning(
            LogTag::Http,
            &format!("blocked request from {} to {}", ip, request.uri().path()),
        );
        return forbidden_response("insufficient IP permission");
    }
    next.run(request).await
}

/// Log method, path, status, latency and client IP for every request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    logger::info(
        LogTag::Http,
        &format!(
            "{} {} {} {:?} {}",
            method,
            path,
            response.status().as_u16(),
            start.elapsed(),
            client_ip
        ),
    );
    response
}
