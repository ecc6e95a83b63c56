//! Middleware module
//!
//! Cross-cutting request concerns applied by the HTTP handlers.

pub mod rate_limit;
pub mod security_headers;

pub use rate_limit::RateLimitMiddleware;
pub use security_headers::json_response_with_security_headers;
