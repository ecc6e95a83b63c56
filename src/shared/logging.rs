//! Logging utilities module
//!
//! This module provides centralized logging functionality and utilities.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Install the global tracing subscriber. `RUST_LOG` controls the
    /// filter; the default level is info.
    pub fn initialize() -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    /// Log an inbound request with structured data
    pub fn log_request(request_id: &str, operation: &str, client_ip: &str) {
        info!(
            request_id = %request_id,
            operation = %operation,
            client_ip = %client_ip,
            "Processing request"
        );
    }

    /// Log a successful response
    pub fn log_success(request_id: &str, operation: &str, duration_ms: u64) {
        info!(
            request_id = %request_id,
            operation = %operation,
            duration_ms = %duration_ms,
            "Request completed successfully"
        );
    }

    /// Log an error response
    pub fn log_error(
        request_id: &str,
        operation: &str,
        error: &crate::shared::error::AppError,
        duration_ms: u64,
    ) {
        error!(
            request_id = %request_id,
            operation = %operation,
            error = %error,
            duration_ms = %duration_ms,
            "Request failed"
        );
    }

    /// Log webhook authentication failures
    pub fn log_auth_failure(operation: &str, details: &str, client_ip: &str) {
        warn!(
            operation = %operation,
            details = %details,
            client_ip = %client_ip,
            "Authentication failure"
        );
    }

    /// Log rate limiting events
    pub fn log_rate_limit(client_ip: &str) {
        warn!(client_ip = %client_ip, "Rate limit exceeded");
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        format!("req_{:x}", now)
    }
}
