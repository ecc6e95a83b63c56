//! Infrastructure adapters module
//!
//! This module contains adapters for external services and infrastructure concerns.

pub mod bakong_client;
pub mod intent_store;
pub mod khqr_encoder;
pub mod order_store;
pub mod webhook_verifier;

// Re-export all adapters
pub use bakong_client::{
    BakongClient, BulkStatusEntry, CheckTransactionResponse, PaymentInfo, PaymentNetwork,
    SettlementData,
};
pub use intent_store::IntentStore;
pub use khqr_encoder::{EncodeRequest, EncodedQr, KhqrEncoder, QrEncoder};
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use webhook_verifier::{HmacSignatureVerifier, SignatureVerifier};
