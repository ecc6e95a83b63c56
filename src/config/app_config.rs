//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::Validate;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: usize,
}

/// Upstream Bakong open API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BakongConfig {
    /// Upstream base URL
    #[validate(url)]
    pub api_url: String,

    /// Bearer token for the upstream API. When absent the service degrades
    /// to fallback mode instead of refusing to start.
    pub api_token: Option<String>,

    /// Connection timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,

    /// Maximum retry attempts for upstream calls
    #[validate(range(min = 0, max = 10))]
    pub max_retries: u32,

    /// Concurrency bound for decomposed bulk status checks
    #[validate(range(min = 1, max = 64))]
    pub batch_concurrency: usize,
}

/// Merchant identity used when building KHQR payloads
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MerchantConfig {
    /// Bakong account id, e.g. `merchant@bank`
    #[validate(length(min = 3, max = 32))]
    pub account_id: String,

    /// Merchant display name (KHQR caps this at 25 characters)
    #[validate(length(min = 1, max = 25))]
    pub name: String,

    /// Merchant city (KHQR caps this at 15 characters)
    #[validate(length(min = 1, max = 15))]
    pub city: String,

    /// Contact phone number included in the additional-data template
    pub phone_number: Option<String>,

    /// Store label included in the additional-data template
    pub store_label: Option<String>,

    /// Terminal label included in the additional-data template
    pub terminal_label: Option<String>,
}

/// Webhook ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WebhookConfig {
    /// Shared secret for HMAC-SHA256 signature verification
    #[validate(length(min = 16))]
    pub shared_secret: String,
}

/// Fallback policy for upstream outages
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FallbackConfig {
    /// When enabled, an unavailable upstream yields a clearly tagged
    /// synthetic `unknown` result instead of a 503. Production deployments
    /// should keep this disabled.
    pub enabled: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Requests per minute per IP
    #[validate(range(min = 1, max = 10000))]
    pub requests_per_minute: u32,

    /// Burst size
    #[validate(range(min = 1, max = 1000))]
    pub burst_size: u32,

    /// Enable rate limiting
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format
    #[validate(length(min = 1))]
    pub format: String,

    /// Enable structured logging
    pub structured: bool,
}

/// Cache configuration for the payment intent store
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Enable the Redis mirror (the in-memory store is always active)
    pub enabled: bool,

    /// Redis connection URL
    #[validate(url)]
    pub redis_url: String,

    /// Intent TTL in seconds
    #[validate(range(min = 60, max = 604800))] // 1 minute to 7 days
    pub intent_ttl_seconds: u64,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Upstream Bakong API configuration
    pub bakong: BakongConfig,

    /// Merchant identity
    pub merchant: MerchantConfig,

    /// Webhook configuration
    pub webhook: WebhookConfig,

    /// Fallback policy
    pub fallback: FallbackConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Intent cache configuration
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".parse().unwrap(),
                port: 8080,
                max_request_size: 64 * 1024, // 64KB; payment payloads are small
            },
            bakong: BakongConfig {
                api_url: "https://api-bakong.nbc.gov.kh".to_string(),
                api_token: None,
                timeout_seconds: 30,
                max_retries: 2,
                batch_concurrency: 8,
            },
            merchant: MerchantConfig {
                account_id: "merchant@devbank".to_string(),
                name: "Baby Bear".to_string(),
                city: "Phnom Penh".to_string(),
                phone_number: Some("85592886006".to_string()),
                store_label: Some("Baby Bear".to_string()),
                terminal_label: Some("Cashier-01".to_string()),
            },
            webhook: WebhookConfig {
                shared_secret: "change-me-to-a-long-random-secret".to_string(),
            },
            fallback: FallbackConfig { enabled: false },
            rate_limit: RateLimitConfig {
                requests_per_minute: 600,
                burst_size: 50,
                enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                structured: true,
            },
            cache: CacheConfig {
                enabled: false,
                redis_url: "redis://127.0.0.1:6379".to_string(),
                intent_ttl_seconds: 48 * 3600,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix("KHQR").separator("__"))
            .build()
            .map_err(|e| {
                crate::shared::error::AppError::Config(format!(
                    "Failed to build configuration: {}",
                    e
                ))
            })?;

        let config: AppConfig = config.try_deserialize().map_err(|e| {
            crate::shared::error::AppError::Config(format!(
                "Failed to deserialize configuration: {}",
                e
            ))
        })?;

        config.validate_config().map_err(|e| {
            crate::shared::error::AppError::Config(format!("Configuration validation failed: {}", e))
        })?;

        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.bakong.validate()?;
        self.merchant.validate()?;
        self.webhook.validate()?;
        self.fallback.validate()?;
        self.rate_limit.validate()?;
        self.logging.validate()?;
        self.cache.validate()?;

        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Whether the service can reach the upstream at all. Without a token
    /// every status check is doomed to 401, so the service reports itself
    /// as degraded.
    pub fn upstream_configured(&self) -> bool {
        self.bakong
            .api_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}
