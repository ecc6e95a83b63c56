//! Test suite for the KHQR payment server
//!
//! Unit tests live next to the code they cover; this tree holds the
//! shared mock network, cross-component unit tests, and the HTTP
//! integration tests that run the full filter stack.

pub mod common;
pub mod integration;
pub mod unit;

/// Test configuration and utilities
pub mod config {
    use crate::config::AppConfig;

    pub const TEST_WEBHOOK_SECRET: &str = "a-long-shared-secret-for-tests";

    /// Create test configuration
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();

        config.server.port = 0; // Use random port
        config.server.bind_address = "127.0.0.1".parse().unwrap();
        config.webhook.shared_secret = TEST_WEBHOOK_SECRET.to_string();
        config.cache.enabled = false; // Disable the Redis mirror for tests
        config.rate_limit.enabled = false; // Disable rate limiting for tests

        config
    }

    /// Test configuration with the outage fallback policy enabled
    pub fn fallback_test_config() -> AppConfig {
        let mut config = test_config();
        config.fallback.enabled = true;
        config
    }
}
