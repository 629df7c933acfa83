//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::AppState;
use aixiv_common::config::RateLimitConfig;
use aixiv_common::errors::{AppError, Result};

/// Process-wide limiter plus the quota it enforces
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultDirectRateLimiter>,
    per_second: u32,
}

impl RateLimit {
    pub fn check(&self) -> Result<()> {
        self.limiter.check().map_err(|_| AppError::RateLimited {
            limit: self.per_second,
        })
    }
}

/// Create a new rate limiter; `None` when limiting is disabled
pub fn create_rate_limiter(config: &RateLimitConfig) -> Result<Option<RateLimit>> {
    if !config.enabled {
        return Ok(None);
    }

    let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.requests_per_second must be at least 1".to_string(),
    })?;
    let burst = NonZeroU32::new(config.burst).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.burst must be at least 1".to_string(),
    })?;

    let quota = Quota::per_second(per_second).allow_burst(burst);

    Ok(Some(RateLimit {
        limiter: Arc::new(RateLimiter::direct(quota)),
        per_second: per_second.get(),
    }))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    if let Some(limit) = &state.rate_limit {
        if let Err(e) = limit.check() {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            return Err(e);
        }
    }
    Ok(next.run(request).await)
}
