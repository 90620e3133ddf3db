//! Per-client request throttling
//!
//! Token-bucket limiter keyed by client IP. Buckets refill continuously at
//! the configured rate and hold up to double it as burst headroom.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// One client's bucket: remaining tokens and when they were last topped up
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Shared limiter state, cheap to clone into the middleware layer
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, Bucket>>>,
    rate: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let rate = f64::from(requests_per_second);
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            rate,
            burst: rate * 2.0,
        }
    }

    /// Take one token for `client`; false means the caller is throttled
    pub async fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.inner.lock().await;

        let bucket = buckets.entry(client.to_string()).or_insert(Bucket {
            tokens: self.burst,
            refilled_at: now,
        });

        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.refilled_at = now;

        if bucket.tokens < 1.0 {
            return false;
        }
        bucket.tokens -= 1.0;
        true
    }

    /// Drop buckets idle longer than `max_idle`, so the map does not grow
    /// with every address ever seen. Called from a background task.
    pub async fn cleanup(&self, max_idle: Duration) {
        let now = Instant::now();
        self.inner
            .lock()
            .await
            .retain(|_, b| now.duration_since(b.refilled_at) < max_idle);
    }
}

/// Middleware entry point; attach with `from_fn_with_state(limiter, rate_limit)`
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    if !limiter.allow(&client).await {
        tracing::warn!(client = %client, "Request throttled");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            "Too many requests. Please try again later.",
        )
            .into_response();
    }

    next.run(request).await
}

/// Client identity for bucketing: first X-Forwarded-For hop, then X-Real-IP
fn client_key(request: &Request) -> String {
    let headers = request.headers();

    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_then_throttle() {
        let limiter = RateLimiter::new(5);

        // Burst capacity is 2x the per-second rate
        for _ in 0..10 {
            assert!(limiter.allow("10.0.0.1").await);
        }
        assert!(!limiter.allow("10.0.0.1").await);
    }

    #[tokio::test]
    async fn test_clients_do_not_share_buckets() {
        let limiter = RateLimiter::new(1);

        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_buckets() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.allow("10.0.0.1").await);

        limiter.cleanup(Duration::ZERO).await;

        assert!(limiter.inner.lock().await.is_empty());
    }
}
