//! KHQR Payment Server - payment intent reconciliation for the Bakong network
//!
//! This library generates KHQR payment intents, resolves their settlement
//! status against the Bakong open API, ingests signed settlement webhooks,
//! and keeps per-order payment state consistent under concurrent signals.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod middleware;
pub mod shared;

#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use infrastructure::http::PaymentServer;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;
