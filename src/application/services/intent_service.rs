//! Payment intent builder
//!
//! Assembles a checkout request into a canonical KHQR payload through the
//! encoder capability. This service is a pure transformation plus one
//! encoder call; persisting the intent is the caller's responsibility.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::payment::{Currency, MerchantIdentity, PaymentIntent};
use crate::infrastructure::adapters::{EncodeRequest, QrEncoder};
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::PaymentMetrics;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: f64,
    pub currency: String,
    pub bill_number: String,
}

pub struct IntentService {
    merchant: MerchantIdentity,
    encoder: Arc<dyn QrEncoder>,
    metrics: Arc<PaymentMetrics>,
}

impl IntentService {
    pub fn new(
        config: Arc<AppConfig>,
        encoder: Arc<dyn QrEncoder>,
        metrics: Arc<PaymentMetrics>,
    ) -> Self {
        let m = &config.merchant;
        let merchant = MerchantIdentity {
            account_id: m.account_id.clone(),
            name: m.name.clone(),
            city: m.city.clone(),
            phone_number: m.phone_number.clone(),
            store_label: m.store_label.clone(),
            terminal_label: m.terminal_label.clone(),
        };

        Self {
            merchant,
            encoder,
            metrics,
        }
    }

    /// Validate the request and produce the intent. Identical input yields
    /// an identical fingerprint because the encoder is deterministic.
    pub fn create_intent(&self, request: &CreateIntentRequest) -> AppResult<PaymentIntent> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(AppError::InvalidRequest(
                "amount must be a positive number".to_string(),
            ));
        }
        let currency: Currency = request
            .currency
            .parse()
            .map_err(AppError::InvalidRequest)?;
        if request.bill_number.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "bill_number is required".to_string(),
            ));
        }
        if request.bill_number.len() > 25 {
            return Err(AppError::InvalidRequest(
                "bill_number must be at most 25 characters".to_string(),
            ));
        }

        let encoded = self.encoder.encode(&EncodeRequest {
            merchant: self.merchant.clone(),
            amount: request.amount,
            currency,
            bill_number: request.bill_number.clone(),
        })?;

        info!(
            fingerprint = %encoded.fingerprint,
            bill_number = %request.bill_number,
            currency = %currency.as_str(),
            "Payment intent created"
        );
        self.metrics.intents_created.inc();

        Ok(PaymentIntent {
            fingerprint: encoded.fingerprint,
            qr_payload: encoded.qr_payload,
            amount: request.amount,
            currency,
            bill_number: request.bill_number.clone(),
            created_at: chrono::Utc::now(),
        })
    }
}
