//! Application services module
//!
//! This module contains the business services orchestrating the payment
//! reconciliation flow.

pub mod intent_service;
pub mod order_service;
pub mod status_service;
pub mod webhook_service;

// Re-export services
pub use intent_service::{CreateIntentRequest, IntentService};
pub use order_service::{OrderService, PlaceOrderRequest, PollOutcome};
pub use status_service::{BatchEntry, StatusService};
pub use webhook_service::{WebhookOutcome, WebhookPayload, WebhookService};
