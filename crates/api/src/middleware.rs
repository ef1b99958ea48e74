// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing
//!
//! Scan requests are throttled per client IP with a token bucket: each client
//! may burst up to `burst` scans, and tokens refill at `requests_per_minute`.
//! A throttled request gets a 429 in the same JSON shape as a scan result,
//! with a `Retry-After` header telling the client when a token is available.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use shared_types::ScanStatus;
use tracing::{debug, warn};

use crate::{config::RateLimitingConfig, metrics, routes::handlers::ScanResponse};

/// Buckets kept before idle clients are pruned
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Outcome of asking the limiter to admit one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The scan may proceed
    Allowed,
    /// The client is out of tokens until `retry_after` has passed
    Throttled {
        /// Time until the next token is available
        retry_after: Duration,
    },
}

impl Admission {
    /// Whether the scan may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

/// Per-IP token bucket limiter for the scan endpoint
#[derive(Debug, Clone)]
pub struct ScanRateLimiter {
    enabled: bool,
    capacity: f64,
    seconds_per_token: f64,
    buckets: Arc<DashMap<IpAddr, Bucket>>,
}

impl ScanRateLimiter {
    /// Create a limiter from configuration
    pub fn new(config: &RateLimitingConfig) -> Self {
        Self {
            enabled: config.enabled,
            capacity: f64::from(config.burst.max(1)),
            seconds_per_token: 60.0 / f64::from(config.requests_per_minute.max(1)),
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of client IPs currently holding a bucket
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Take one token for `ip`
    pub fn admit(&self, ip: IpAddr) -> Admission {
        self.admit_at(ip, Instant::now())
    }

    fn admit_at(&self, ip: IpAddr, now: Instant) -> Admission {
        if !self.enabled {
            return Admission::Allowed;
        }

        if self.buckets.len() >= MAX_TRACKED_CLIENTS {
            self.prune_idle(now);
        }

        let mut bucket = self.buckets.entry(ip).or_insert(Bucket {
            tokens: self.capacity,
            refreshed: now,
        });
        bucket.tokens = self.refilled(&bucket, now);
        bucket.refreshed = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Admission::Allowed
        } else {
            let missing = 1.0 - bucket.tokens;
            Admission::Throttled {
                retry_after: Duration::from_secs_f64(missing * self.seconds_per_token),
            }
        }
    }

    fn refilled(&self, bucket: &Bucket, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(bucket.refreshed).as_secs_f64();
        (bucket.tokens + elapsed / self.seconds_per_token).min(self.capacity)
    }

    /// Drop buckets that have refilled completely; they behave like new clients
    fn prune_idle(&self, now: Instant) {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| self.refilled(bucket, now) < self.capacity);
        debug!(
            pruned = before.saturating_sub(self.buckets.len()),
            "pruned idle rate limiter buckets"
        );
    }
}

/// Whole seconds for a `Retry-After` header, never zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn retry_after_seconds(retry_after: Duration) -> u64 {
    retry_after.as_secs_f64().ceil().max(1.0) as u64
}

/// Rate limiting middleware for the scan route
pub async fn scan_rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<ScanRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    match limiter.admit(addr.ip()) {
        Admission::Allowed => next.run(req).await,
        Admission::Throttled { retry_after } => {
            let seconds = retry_after_seconds(retry_after);
            warn!(client = %addr.ip(), retry_after_secs = seconds, "scan request throttled");
            metrics::inc_throttled_requests();
            throttled_response(seconds)
        }
    }
}

fn throttled_response(seconds: u64) -> Response {
    let body = ScanResponse {
        status: ScanStatus::Error,
        message: format!("too many scan requests, retry in {seconds} seconds"),
        url: None,
    };
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    response
}
