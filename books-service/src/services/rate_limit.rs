//! Fixed-window request counters keyed by client IP.

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Outcome of counting one request against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, trust_proxy: bool) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            trust_proxy,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Counts one request for `client` and reports whether it fits the budget.
    pub fn check(&self, client: &str) -> RateLimitDecision {
        let now = Instant::now();
        let window_len = self.config.window;

        let mut window = self
            .windows
            .entry(client.to_string())
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now.duration_since(window.started_at) >= window_len {
            window.started_at = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);

        let limit = self.config.max_requests;
        let elapsed = now.duration_since(window.started_at);
        RateLimitDecision {
            allowed: window.count <= limit,
            limit,
            remaining: limit.saturating_sub(window.count),
            reset_after: window_len.saturating_sub(elapsed),
        }
    }

    /// Forgets windows that have already elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let window_len = self.config.window;
        self.windows
            .retain(|_, window| now.duration_since(window.started_at) < window_len);
    }

    fn client_key(&self, request: &Request) -> String {
        if self.trust_proxy {
            let forwarded = request
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());
            if let Some(ip) = forwarded {
                return ip.to_string();
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Middleware: rejects with 429 before the handler runs once the budget is spent.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = limiter.client_key(&request);
    let decision = limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(
            "Rate limit exceeded for {} on {}",
            client,
            request.uri().path()
        );
        ApiError::RateLimited {
            message: limiter.config().message,
            retry_after: decision.reset_after,
        }
        .into_response()
    };

    apply_headers(response.headers_mut(), &decision, limiter.config().window);
    response
}

/// Writes the standard `RateLimit-*` headers. An inner limiter that already
/// set them keeps its values.
fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision, window: Duration) {
    let reset_secs = decision.reset_after.as_secs_f64().ceil() as u64;
    let values = [
        ("ratelimit-policy", format!("{};w={}", decision.limit, window.as_secs())),
        ("ratelimit-limit", decision.limit.to_string()),
        ("ratelimit-remaining", decision.remaining.to_string()),
        ("ratelimit-reset", reset_secs.to_string()),
    ];

    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers
                .entry(HeaderName::from_static(name))
                .or_insert(value);
        }
    }
}
