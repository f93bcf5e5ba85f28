use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use cdc_core::Actor;

use crate::state::AppState;

/// Injected throttle for mutating callers. Keyed by actor id rather than a
/// process-wide map so deployments with several instances can swap in a
/// shared implementation.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Takes one token for `key`; false means the caller is over the limit.
    async fn try_acquire(&self, key: &str) -> bool;
}

/// Token bucket per actor: capacity `burst`, refilled at `per_minute`.
pub struct TokenBucketLimiter {
    burst: f64,
    per_second: f64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucketLimiter {
    pub fn new(burst: u32, per_minute: u32) -> Self {
        Self {
            burst: f64::from(burst),
            per_second: f64::from(per_minute) / 60.0,
            buckets: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Runs after authentication, so the verified actor id is the bucket key.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let key = req
        .extensions()
        .get::<Actor>()
        .map(|a| a.id.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    if state.limiter.try_acquire(&key).await {
        Ok(next.run(req).await)
    } else {
        Err((StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"))
    }
}
