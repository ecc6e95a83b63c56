//! Per-client rate limiting
//!
//! One keyed limiter built at startup and shared by every handler. Keys
//! are client IPs as reported by the reverse proxy.

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::AppConfig;
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;

pub struct RateLimitMiddleware {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
}

impl RateLimitMiddleware {
    pub fn new(config: &AppConfig) -> Self {
        let limiter = if config.rate_limit.enabled {
            let per_minute = NonZeroU32::new(config.rate_limit.requests_per_minute)
                .unwrap_or(NonZeroU32::MIN);
            let burst = NonZeroU32::new(config.rate_limit.burst_size).unwrap_or(NonZeroU32::MIN);
            Some(RateLimiter::keyed(
                Quota::per_minute(per_minute).allow_burst(burst),
            ))
        } else {
            None
        };

        Self { limiter }
    }

    /// Check the per-client quota; `RateLimit` errors map to 429
    pub fn check(&self, client_ip: &str) -> AppResult<()> {
        if let Some(limiter) = &self.limiter {
            if limiter.check_key(&client_ip.to_string()).is_err() {
                LoggingUtils::log_rate_limit(client_ip);
                return Err(AppError::RateLimit);
            }
        }
        Ok(())
    }
}
