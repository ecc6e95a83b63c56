//! HTTP models - Infrastructure concerns
//!
//! Request/response structures for the public API surface, kept separate
//! from the domain types so wire-compatibility changes never leak inward.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::BatchEntry;
use crate::domain::order::{ConfirmationStatus, Order, OrderPaymentStatus, PaymentMethod, ReviewAction};
use crate::domain::payment::{Currency, PaymentIntent, PaymentStatus};
use crate::shared::logging::LoggingUtils;

/// Body of `POST /bakong/generate-qr`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQrRequest {
    pub amount: f64,

    /// "USD" or "KHR"
    #[validate(length(min = 3, max = 3))]
    pub currency: String,

    #[validate(length(min = 1, max = 25))]
    pub bill_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQrResponse {
    pub success: bool,
    pub qr_string: String,
    pub md5_hash: String,
    pub amount: f64,
    pub currency: Currency,
    pub bill_number: String,
}

impl GenerateQrResponse {
    pub fn from_intent(intent: &PaymentIntent) -> Self {
        Self {
            success: true,
            qr_string: intent.qr_payload.clone(),
            md5_hash: intent.fingerprint.clone(),
            amount: intent.amount,
            currency: intent.currency,
            bill_number: intent.bill_number.clone(),
        }
    }
}

/// Body of `POST /bakong/check-payment`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckPaymentRequest {
    pub md5_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckPaymentResponse {
    pub success: bool,
    pub status: PaymentStatus,
    pub is_paid: bool,
    /// True when this result was fabricated by the outage fallback and
    /// must not be treated as payment confirmation
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Body of `POST /bakong/check-bulk-payment`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCheckRequest {
    pub md5_hashes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCheckResponse {
    pub success: bool,
    pub total_checked: usize,
    pub paid_count: usize,
    /// Fingerprints with an authoritative PAID resolution
    pub paid_transactions: Vec<String>,
    pub payment_details: Vec<BatchEntry>,
}

impl BulkCheckResponse {
    pub fn from_entries(entries: Vec<BatchEntry>) -> Self {
        let paid_transactions: Vec<String> = entries
            .iter()
            .filter(|e| e.resolution.is_authoritative_paid())
            .map(|e| e.fingerprint.clone())
            .collect();

        Self {
            success: true,
            total_checked: entries.len(),
            paid_count: paid_transactions.len(),
            paid_transactions,
            payment_details: entries,
        }
    }
}

/// Response of `POST /bakong/webhook`
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub order_id: String,
    pub status: PaymentStatus,
    pub changed: bool,
}

/// Body of `POST /orders/{id}/proof`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachProofRequest {
    #[validate(length(min = 1))]
    pub transaction_image: String,
}

/// Body of `POST /orders/{id}/review`
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

/// Wire representation of an order's payment state
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub bill_number: String,
    pub payment_method: PaymentMethod,
    pub payment_status: OrderPaymentStatus,
    pub confirmation_status: ConfirmationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrderView {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            amount: order.amount,
            currency: order.currency,
            bill_number: order.bill_number.clone(),
            payment_method: order.payment.method,
            payment_status: order.payment.status,
            confirmation_status: order.payment.confirmation,
            transaction_id: order.payment.transaction_id.clone(),
            transaction_image: order.payment.transaction_image.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderView,
}

impl OrderResponse {
    pub fn from_order(order: &Order) -> Self {
        Self {
            success: true,
            order: OrderView::from_order(order),
        }
    }
}

/// Response of `POST /orders/{id}/poll-payment`
#[derive(Debug, Clone, Serialize)]
pub struct PollPaymentResponse {
    pub success: bool,
    pub status: PaymentStatus,
    pub synthetic: bool,
    pub order: OrderView,
}

/// Request context for tracking and logging
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub client_ip: String,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl RequestContext {
    /// Build a context for one inbound request. The client IP comes from
    /// the reverse proxy's forwarding header when present.
    pub fn new(client_ip: Option<String>, operation: &str) -> Self {
        Self {
            request_id: LoggingUtils::generate_request_id(),
            client_ip: client_ip
                .filter(|ip| !ip.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            operation: operation.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}
