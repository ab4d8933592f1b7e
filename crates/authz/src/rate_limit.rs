//! Per-credential request throttling.
//!
//! The current limiter is a stand-in: it always allows the request and
//! reports `remaining = limit - 1`. A real implementation needs a shared
//! counter with expiry keyed by `(key id, window start)`, kept behind this
//! module so the pipeline does not change when it lands.

use adminjet_models::RateLimits;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitWindow {
    Minute,
    Hour,
    Day,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub window: RateLimitWindow,
}

#[derive(Debug, Clone, Default)]
pub struct RateLimiter;

impl RateLimiter {
    pub fn new() -> Self {
        Self
    }

    pub fn check(
        &self,
        key_id: &Uuid,
        limits: &RateLimits,
        window: RateLimitWindow,
    ) -> RateLimitDecision {
        let limit = match window {
            RateLimitWindow::Minute => limits.requests_per_minute,
            RateLimitWindow::Hour => limits.requests_per_hour,
            RateLimitWindow::Day => limits.requests_per_day,
        };

        tracing::trace!(%key_id, limit, ?window, "rate limit check (pass-through)");

        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(1),
            window,
        }
    }
}
