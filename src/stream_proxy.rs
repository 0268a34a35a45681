use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use std::sync::Arc;

const EVENT_STREAM: &str = "text/event-stream";

/// GET /api/v1/whatsapp/stream
///
/// Transparent passthrough of the backend's WhatsApp event stream. Chunks are
/// forwarded as they arrive. When the dashboard disconnects, axum drops the
/// body, which drops the upstream response and closes that connection too.
pub async fn whatsapp_stream(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let gateway = state.gateway()?;
    let upstream = gateway.open_whatsapp_stream().await?;
    tracing::info!(
        "WhatsApp event stream opened ({}), upstream status {}",
        gateway.persona(),
        upstream.status()
    );
    passthrough(upstream)
}

/// Wraps an upstream response as a streaming response, keeping its status and
/// content type and disabling caching and proxy buffering.
pub fn passthrough(upstream: reqwest::Response) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static(EVENT_STREAM));

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache, no-transform")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::InternalError(format!("Failed to build stream response: {}", e)))
}
