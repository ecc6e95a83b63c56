//! Domain layer - Core business logic and models
//!
//! This module contains the payment and order domain models and the order
//! payment state machine.

pub mod order;
pub mod payment;

pub use order::{
    ConfirmationStatus, Order, OrderPaymentState, OrderPaymentStatus, PaymentMethod,
    PaymentTransition, ReviewAction, TransitionOutcome,
};
pub use payment::{Currency, MerchantIdentity, PaymentIntent, PaymentStatus, StatusResolution};
