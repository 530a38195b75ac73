/// Response helpers for the JSON envelope used by every endpoint
///
/// Business failures are reported inside a 200 envelope with
/// `status: "error"`; only the IP gate answers with an HTTP error code.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

pub fn success_response(message: &str) -> Response {
    Json(json!({
        "status": "success",
        "message": message,
    }))
    .into_response()
}

pub fn success_with(message: &str, key: &str, value: Value) -> Response {
    Json(json!({
        "status": "success",
        "message": message,
        key: value,
    }))
    .into_response()
}

pub fn error_response(message: &str) -> Response {
    Json(json!({
        "status": "error",
        "message": message,
    }))
    .into_response()
}

pub fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
