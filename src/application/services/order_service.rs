//! Order payment orchestration
//!
//! Places orders, exposes their payment state, and drives the three ways
//! an order settles: resolver polls for instant QR, proof upload plus
//! seller review for bank transfers. Synthetic resolver results are
//! observability only and never move an order.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::application::services::status_service::StatusService;
use crate::domain::order::{
    Order, OrderPaymentState, PaymentMethod, PaymentTransition, ReviewAction, TransitionOutcome,
};
use crate::domain::payment::{Currency, PaymentStatus, StatusResolution};
use crate::infrastructure::adapters::OrderStore;
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::PaymentMetrics;

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub amount: f64,
    pub currency: String,
    pub bill_number: String,
    pub payment_method: PaymentMethod,
    /// PaymentIntent fingerprint; required for BAKONG orders
    pub transaction_id: Option<String>,
    /// Transfer proof image reference; ABA orders only
    pub transaction_image: Option<String>,
}

/// Result of polling an order's settlement status
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub order: Order,
    pub resolution: StatusResolution,
}

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    status: Arc<StatusService>,
    metrics: Arc<PaymentMetrics>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        status: Arc<StatusService>,
        metrics: Arc<PaymentMetrics>,
    ) -> Self {
        Self {
            orders,
            status,
            metrics,
        }
    }

    pub async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<Order> {
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

        let payment = OrderPaymentState::new_for(
            request.payment_method,
            request.transaction_id.clone(),
            request.transaction_image.clone(),
        )?;

        let now = chrono::Utc::now();
        let order = Order {
            order_id: Uuid::new_v4().to_string(),
            amount: request.amount,
            currency,
            bill_number: request.bill_number.clone(),
            payment,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(order.clone()).await?;
        info!(
            order_id = %order.order_id,
            method = %order.payment.method.as_str(),
            bill_number = %order.bill_number,
            "Order placed"
        );
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> AppResult<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", order_id)))
    }

    /// Poll the upstream network for an instant-QR order and settle it if
    /// the answer is authoritative. Synthetic results are reported to the
    /// caller but leave the order exactly as it was.
    pub async fn poll_payment(&self, order_id: &str) -> AppResult<PollOutcome> {
        let order = self.get_order(order_id).await?;

        if order.payment.method != PaymentMethod::InstantQr {
            return Err(AppError::InvalidRequest(format!(
                "order {} is not paid via instant QR",
                order_id
            )));
        }
        let fingerprint = order.payment.transaction_id.clone().ok_or_else(|| {
            AppError::Internal(format!("order {} has no fingerprint", order_id))
        })?;

        let resolution = self.status.check_one(&fingerprint).await?;

        if resolution.synthetic {
            return Ok(PollOutcome { order, resolution });
        }

        let order = match resolution.status {
            PaymentStatus::Paid | PaymentStatus::Unpaid => {
                self.settle(&order.order_id, resolution.status).await?
            }
            PaymentStatus::Pending | PaymentStatus::Unknown => order,
        };

        Ok(PollOutcome { order, resolution })
    }

    /// Attach a transfer proof image to a bank-transfer order
    pub async fn attach_proof(&self, order_id: &str, image: &str) -> AppResult<Order> {
        let (order, outcome) = self
            .orders
            .apply_transition(
                order_id,
                &PaymentTransition::AttachProof {
                    image: image.to_string(),
                },
            )
            .await?;
        self.record(&outcome);
        Ok(order)
    }

    /// Seller decision on an uploaded transfer proof
    pub async fn review(&self, order_id: &str, action: ReviewAction) -> AppResult<Order> {
        let (order, outcome) = self
            .orders
            .apply_transition(order_id, &PaymentTransition::Review(action))
            .await?;
        self.record(&outcome);
        Ok(order)
    }

    async fn settle(&self, order_id: &str, signal: PaymentStatus) -> AppResult<Order> {
        let (order, outcome) = self
            .orders
            .apply_transition(order_id, &PaymentTransition::Settle(signal))
            .await?;
        self.record(&outcome);
        Ok(order)
    }

    fn record(&self, outcome: &TransitionOutcome) {
        if let TransitionOutcome::Applied(next) = outcome {
            self.metrics
                .transitions
                .with_label_values(&[next.status.as_str()])
                .inc();
        }
    }
}
