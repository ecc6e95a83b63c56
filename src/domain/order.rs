//! Order payment state machine
//!
//! The per-order payment record and its transition rules. Transitions are
//! expressed as a pure function so the store can execute them inside a
//! single atomic conditional update; idempotent redeliveries come back as
//! `Unchanged` instead of an error.

use serde::{Deserialize, Serialize};

use crate::domain::payment::{Currency, PaymentStatus};
use crate::shared::error::{AppError, AppResult};

/// How the customer chose to pay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    CashOnDelivery,
    #[serde(rename = "ABA")]
    BankTransfer,
    #[serde(rename = "BAKONG")]
    InstantQr,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "COD",
            PaymentMethod::BankTransfer => "ABA",
            PaymentMethod::InstantQr => "BAKONG",
        }
    }
}

/// Order payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderPaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    PendingConfirmation,
}

impl OrderPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPaymentStatus::Pending => "pending",
            OrderPaymentStatus::Paid => "paid",
            OrderPaymentStatus::Failed => "failed",
            OrderPaymentStatus::Refunded => "refunded",
            OrderPaymentStatus::PendingConfirmation => "pending_confirmation",
        }
    }

    /// Terminal for this flow; refunds are an externally triggered
    /// transition outside the reconciliation path.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderPaymentStatus::Paid | OrderPaymentStatus::Failed | OrderPaymentStatus::Refunded
        )
    }
}

/// Manual review status for bank-transfer proofs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    #[serde(rename = "na")]
    NotApplicable,
    PendingReview,
    Confirmed,
    Rejected,
}

/// Seller decision on an uploaded transfer proof
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Confirm,
    Reject,
}

/// A requested change to the payment state
#[derive(Debug, Clone)]
pub enum PaymentTransition {
    /// Settlement signal from the status resolver or a verified webhook
    Settle(PaymentStatus),
    /// Customer uploaded a transfer proof image
    AttachProof { image: String },
    /// Seller reviewed the transfer proof
    Review(ReviewAction),
}

/// Result of applying a transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The state changed
    Applied(OrderPaymentState),
    /// Idempotent no-op: the order was already in the corresponding state
    Unchanged,
}

/// Payment fields owned exclusively by one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderPaymentState {
    pub method: PaymentMethod,

    /// PaymentIntent fingerprint; set only for InstantQr orders
    pub transaction_id: Option<String>,

    /// Uploaded proof image reference; set only for BankTransfer orders
    pub transaction_image: Option<String>,

    pub status: OrderPaymentStatus,
    pub confirmation: ConfirmationStatus,
}

impl OrderPaymentState {
    /// Build the initial payment state for a new order, enforcing the
    /// per-method field invariants.
    pub fn new_for(
        method: PaymentMethod,
        transaction_id: Option<String>,
        transaction_image: Option<String>,
    ) -> AppResult<Self> {
        match method {
            PaymentMethod::InstantQr => {
                let fingerprint = transaction_id.filter(|t| !t.is_empty()).ok_or_else(|| {
                    AppError::InvalidRequest(
                        "Bakong payment details (MD5 hash) are required".to_string(),
                    )
                })?;
                Ok(Self {
                    method,
                    transaction_id: Some(fingerprint),
                    transaction_image: None,
                    status: OrderPaymentStatus::Pending,
                    confirmation: ConfirmationStatus::NotApplicable,
                })
            }
            PaymentMethod::BankTransfer => {
                // A proof supplied at placement time skips straight to review
                let (status, confirmation) = if transaction_image.is_some() {
                    (
                        OrderPaymentStatus::PendingConfirmation,
                        ConfirmationStatus::PendingReview,
                    )
                } else {
                    (
                        OrderPaymentStatus::Pending,
                        ConfirmationStatus::PendingReview,
                    )
                };
                Ok(Self {
                    method,
                    transaction_id: None,
                    transaction_image,
                    status,
                    confirmation,
                })
            }
            PaymentMethod::CashOnDelivery => Ok(Self {
                method,
                transaction_id: None,
                transaction_image: None,
                status: OrderPaymentStatus::Pending,
                confirmation: ConfirmationStatus::NotApplicable,
            }),
        }
    }

    /// Apply a transition, returning the new state, an idempotent no-op,
    /// or `InvalidStateTransition`. Never mutates `self`.
    pub fn apply(&self, transition: &PaymentTransition) -> AppResult<TransitionOutcome> {
        match transition {
            PaymentTransition::Settle(signal) => self.apply_settlement(*signal),
            PaymentTransition::AttachProof { image } => self.apply_proof(image),
            PaymentTransition::Review(action) => self.apply_review(*action),
        }
    }

    fn apply_settlement(&self, signal: PaymentStatus) -> AppResult<TransitionOutcome> {
        if self.method != PaymentMethod::InstantQr {
            // Bank transfers settle only through seller review; COD settles
            // outside this flow entirely.
            return Err(self.illegal("paid"));
        }

        match signal {
            PaymentStatus::Paid => match self.status {
                OrderPaymentStatus::Pending => Ok(TransitionOutcome::Applied(Self {
                    status: OrderPaymentStatus::Paid,
                    confirmation: ConfirmationStatus::NotApplicable,
                    ..self.clone()
                })),
                OrderPaymentStatus::Paid => Ok(TransitionOutcome::Unchanged),
                _ => Err(self.illegal("paid")),
            },
            PaymentStatus::Unpaid => match self.status {
                OrderPaymentStatus::Pending => Ok(TransitionOutcome::Applied(Self {
                    status: OrderPaymentStatus::Failed,
                    ..self.clone()
                })),
                OrderPaymentStatus::Failed => Ok(TransitionOutcome::Unchanged),
                _ => Err(self.illegal("failed")),
            },
            // Transient signals never fail an order prematurely
            PaymentStatus::Pending | PaymentStatus::Unknown => Ok(TransitionOutcome::Unchanged),
        }
    }

    fn apply_proof(&self, image: &str) -> AppResult<TransitionOutcome> {
        if self.method != PaymentMethod::BankTransfer {
            return Err(self.illegal("pending_confirmation"));
        }
        if image.is_empty() {
            return Err(AppError::InvalidRequest(
                "transaction proof image is required".to_string(),
            ));
        }

        match self.status {
            OrderPaymentStatus::Pending => Ok(TransitionOutcome::Applied(Self {
                status: OrderPaymentStatus::PendingConfirmation,
                confirmation: ConfirmationStatus::PendingReview,
                transaction_image: Some(image.to_string()),
                ..self.clone()
            })),
            OrderPaymentStatus::PendingConfirmation => Ok(TransitionOutcome::Unchanged),
            _ => Err(self.illegal("pending_confirmation")),
        }
    }

    fn apply_review(&self, action: ReviewAction) -> AppResult<TransitionOutcome> {
        if self.method != PaymentMethod::BankTransfer {
            return Err(self.illegal("confirmed"));
        }

        match (self.status, action) {
            (OrderPaymentStatus::PendingConfirmation, ReviewAction::Confirm) => {
                Ok(TransitionOutcome::Applied(Self {
                    status: OrderPaymentStatus::Paid,
                    confirmation: ConfirmationStatus::Confirmed,
                    ..self.clone()
                }))
            }
            (OrderPaymentStatus::PendingConfirmation, ReviewAction::Reject) => {
                Ok(TransitionOutcome::Applied(Self {
                    status: OrderPaymentStatus::Failed,
                    confirmation: ConfirmationStatus::Rejected,
                    ..self.clone()
                }))
            }
            (OrderPaymentStatus::Paid, ReviewAction::Confirm) => Ok(TransitionOutcome::Unchanged),
            (OrderPaymentStatus::Failed, ReviewAction::Reject) => Ok(TransitionOutcome::Unchanged),
            _ => Err(self.illegal(match action {
                ReviewAction::Confirm => "paid",
                ReviewAction::Reject => "failed",
            })),
        }
    }

    fn illegal(&self, to: &str) -> AppError {
        AppError::InvalidStateTransition {
            from: self.status.as_str().to_string(),
            to: to.to_string(),
        }
    }
}

/// An order, reduced to the fields the payment flow touches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub bill_number: String,
    pub payment: OrderPaymentState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
