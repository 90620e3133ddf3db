//! Request/response logging with timing

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log each request once on completion with method, path, status, and latency.
/// Level follows the outcome: server errors at error, 4xx at warn.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();

    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, "Request rejected");
    } else {
        tracing::info!(%method, %path, status, elapsed_ms, "Request served");
    }

    response
}
