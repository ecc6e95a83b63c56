//! Configuration module
//!
//! This module handles application configuration loading and validation.

pub mod app_config;

pub use app_config::{
    AppConfig, BakongConfig, CacheConfig, FallbackConfig, LoggingConfig, MerchantConfig,
    RateLimitConfig, ServerConfig, WebhookConfig,
};
