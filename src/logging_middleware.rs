// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Bodies are only buffered when debug logging is enabled and their exact size
//! is known and within `MAX_LOGGED_BODY`. Anything else passes through
//! unlogged. Password and token values are replaced before anything is logged.

use axum::body::{to_bytes, HttpBody};
use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use serde_json::Value;
use tracing::{debug, enabled, Level};

/// JSON keys whose values never reach the log
const REDACTED_KEYS: [&str; 3] = ["password", "token", "tokens"];

/// Largest body that is buffered for logging
const MAX_LOGGED_BODY: usize = 1024 * 1024;

/// Replace sensitive values in a JSON document
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *v = Value::String("[REDACTED]".to_string());
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// True when the body reports an exact length no larger than the log cap
fn fits_log_cap(body: &Body) -> bool {
    body.size_hint()
        .exact()
        .is_some_and(|len| len <= MAX_LOGGED_BODY as u64)
}

fn render_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(body_str) {
        Ok(mut json) => {
            redact(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_default())
        }
        // Non-JSON bodies are summarised, they may carry anything
        Err(_) => Some(format!("<{} bytes>", bytes.len())),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if fits_log_cap(request.body()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        if let Some(rendered) = render_body(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %rendered,
                "Request"
            );
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Request body not logged: size unknown or over the cap"
        );
        request
    };

    let response = next.run(request).await;
    if !fits_log_cap(response.body()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(rendered) = render_body(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %rendered,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
