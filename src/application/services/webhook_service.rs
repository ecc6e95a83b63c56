//! Webhook ingestion
//!
//! Receives settlement notifications pushed by the payment network and
//! turns them into order transitions. Verification is fail-closed: a
//! missing or bad signature rejects the delivery before the body is even
//! parsed. Redelivered notifications land as idempotent no-ops.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::order::{PaymentTransition, TransitionOutcome};
use crate::domain::payment::PaymentStatus;
use crate::infrastructure::adapters::{OrderStore, SignatureVerifier};
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::PaymentMetrics;

/// Notification body pushed by the payment network
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub md5_hash: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

/// What a verified delivery did to the order
#[derive(Debug, Clone, Serialize)]
pub struct WebhookOutcome {
    pub order_id: String,
    pub status: PaymentStatus,
    /// False when the delivery was a duplicate of one already applied
    pub changed: bool,
}

pub struct WebhookService {
    verifier: Arc<dyn SignatureVerifier>,
    orders: Arc<dyn OrderStore>,
    metrics: Arc<PaymentMetrics>,
}

impl WebhookService {
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        orders: Arc<dyn OrderStore>,
        metrics: Arc<PaymentMetrics>,
    ) -> Self {
        Self {
            verifier,
            orders,
            metrics,
        }
    }

    /// Verify, parse, and apply one webhook delivery.
    pub async fn ingest(&self, body: &[u8], signature: Option<&str>) -> AppResult<WebhookOutcome> {
        let signature = signature.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
            self.reject("missing");
            AppError::Authentication("webhook signature header is required".to_string())
        })?;

        if let Err(e) = self.verifier.verify(body, signature) {
            self.reject("bad_signature");
            return Err(e);
        }

        let payload: WebhookPayload = serde_json::from_slice(body).map_err(|e| {
            self.reject("malformed");
            AppError::InvalidRequest(format!("malformed webhook payload: {}", e))
        })?;

        if payload.md5_hash.trim().is_empty() {
            self.reject("malformed");
            return Err(AppError::InvalidRequest(
                "md5_hash is required".to_string(),
            ));
        }

        let status = PaymentStatus::from_upstream_label(&payload.status).ok_or_else(|| {
            self.reject("malformed");
            AppError::InvalidRequest(format!("unrecognized status: {}", payload.status))
        })?;

        let order = self
            .orders
            .find_by_transaction(&payload.md5_hash)
            .await?
            .ok_or_else(|| {
                warn!(fingerprint = %payload.md5_hash, "Webhook for unknown transaction");
                self.reject("unknown_transaction");
                AppError::NotFound(format!(
                    "no order holds transaction {}",
                    payload.md5_hash
                ))
            })?;

        let (_, outcome) = self
            .orders
            .apply_transition(&order.order_id, &PaymentTransition::Settle(status))
            .await?;

        let changed = matches!(outcome, TransitionOutcome::Applied(_));
        let label = if changed { "applied" } else { "duplicate" };
        self.metrics.webhooks.with_label_values(&[label]).inc();

        info!(
            order_id = %order.order_id,
            status = %status.as_str(),
            changed = changed,
            "Webhook delivery processed"
        );

        Ok(WebhookOutcome {
            order_id: order.order_id,
            status,
            changed,
        })
    }

    fn reject(&self, reason: &str) {
        self.metrics.webhooks.with_label_values(&[reason]).inc();
    }
}
