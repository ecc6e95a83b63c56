//! Metrics utilities module
//!
//! Prometheus counters for the payment flow, exposed at `/metrics`.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::shared::error::{AppError, AppResult};

/// Prometheus metrics for the payment server
pub struct PaymentMetrics {
    registry: Registry,

    /// Payment intents created (QR codes generated)
    pub intents_created: IntCounter,

    /// Status checks against the upstream network, labeled by result
    pub status_checks: IntCounterVec,

    /// Synthetic fallback results served in place of upstream truth
    pub synthetic_results: IntCounter,

    /// Webhook deliveries, labeled by outcome
    pub webhooks: IntCounterVec,

    /// Order payment state transitions, labeled by target state
    pub transitions: IntCounterVec,
}

impl PaymentMetrics {
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let intents_created = IntCounter::new(
            "khqr_intents_created_total",
            "Number of payment intents created",
        )
        .map_err(|e| AppError::Internal(format!("metrics init: {}", e)))?;

        let status_checks = IntCounterVec::new(
            Opts::new(
                "khqr_status_checks_total",
                "Upstream settlement status checks by normalized result",
            ),
            &["result"],
        )
        .map_err(|e| AppError::Internal(format!("metrics init: {}", e)))?;

        let synthetic_results = IntCounter::new(
            "khqr_synthetic_results_total",
            "Fallback status results served while the upstream was unavailable",
        )
        .map_err(|e| AppError::Internal(format!("metrics init: {}", e)))?;

        let webhooks = IntCounterVec::new(
            Opts::new("khqr_webhooks_total", "Webhook deliveries by outcome"),
            &["outcome"],
        )
        .map_err(|e| AppError::Internal(format!("metrics init: {}", e)))?;

        let transitions = IntCounterVec::new(
            Opts::new(
                "khqr_payment_transitions_total",
                "Order payment state transitions by target state",
            ),
            &["to"],
        )
        .map_err(|e| AppError::Internal(format!("metrics init: {}", e)))?;

        registry
            .register(Box::new(intents_created.clone()))
            .and_then(|_| registry.register(Box::new(status_checks.clone())))
            .and_then(|_| registry.register(Box::new(synthetic_results.clone())))
            .and_then(|_| registry.register(Box::new(webhooks.clone())))
            .and_then(|_| registry.register(Box::new(transitions.clone())))
            .map_err(|e| AppError::Internal(format!("metrics register: {}", e)))?;

        Ok(Self {
            registry,
            intents_created,
            status_checks,
            synthetic_results,
            webhooks,
            transitions,
        })
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn render(&self) -> AppResult<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| AppError::Internal(format!("metrics encode: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("metrics encode: {}", e)))
    }
}
