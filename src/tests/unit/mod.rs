//! Cross-component unit tests
//!
//! Wire-format assertions that sit above any single module: enum
//! representations and response aggregation.

use serde_json::json;

use crate::application::services::BatchEntry;
use crate::domain::order::{OrderPaymentStatus, PaymentMethod, ReviewAction};
use crate::domain::payment::{PaymentStatus, StatusResolution};
use crate::infrastructure::http::models::{BulkCheckResponse, RequestContext};

#[test]
fn test_payment_method_wire_names() {
    assert_eq!(
        serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
        json!("COD")
    );
    assert_eq!(
        serde_json::to_value(PaymentMethod::BankTransfer).unwrap(),
        json!("ABA")
    );
    assert_eq!(
        serde_json::to_value(PaymentMethod::InstantQr).unwrap(),
        json!("BAKONG")
    );
}

#[test]
fn test_order_status_wire_names_are_snake_case() {
    assert_eq!(
        serde_json::to_value(OrderPaymentStatus::PendingConfirmation).unwrap(),
        json!("pending_confirmation")
    );
    assert_eq!(
        serde_json::to_value(OrderPaymentStatus::Paid).unwrap(),
        json!("paid")
    );
}

#[test]
fn test_review_action_parses_lowercase() {
    let action: ReviewAction = serde_json::from_value(json!("confirm")).unwrap();
    assert_eq!(action, ReviewAction::Confirm);
    let action: ReviewAction = serde_json::from_value(json!("reject")).unwrap();
    assert_eq!(action, ReviewAction::Reject);
}

#[test]
fn test_bulk_response_counts_only_authoritative_paid() {
    let entries = vec![
        BatchEntry {
            fingerprint: "aaa".to_string(),
            resolution: StatusResolution::confirmed(PaymentStatus::Paid, Some("TXN-A".into())),
            amount: Some(12.50),
            timestamp: None,
        },
        BatchEntry {
            fingerprint: "bbb".to_string(),
            resolution: StatusResolution::confirmed(PaymentStatus::Pending, None),
            amount: None,
            timestamp: None,
        },
        // synthetic PAID must never be counted, even if it somehow occurs
        BatchEntry {
            fingerprint: "ccc".to_string(),
            resolution: StatusResolution {
                status: PaymentStatus::Paid,
                synthetic: true,
                transaction_id: None,
            },
            amount: None,
            timestamp: None,
        },
    ];

    let response = BulkCheckResponse::from_entries(entries);
    assert_eq!(response.total_checked, 3);
    assert_eq!(response.paid_count, 1);
    assert_eq!(response.paid_transactions, vec!["aaa".to_string()]);
}

#[test]
fn test_request_context_defaults_missing_client_ip() {
    let context = RequestContext::new(None, "test.op");
    assert_eq!(context.client_ip, "unknown");
    assert!(context.request_id.starts_with("req_"));

    let context = RequestContext::new(Some("  ".to_string()), "test.op");
    assert_eq!(context.client_ip, "unknown");

    let context = RequestContext::new(Some("10.0.0.1".to_string()), "test.op");
    assert_eq!(context.client_ip, "10.0.0.1");
}

#[test]
fn test_batch_entry_serialization_flattens_resolution() {
    let entry = BatchEntry {
        fingerprint: "aaa".to_string(),
        resolution: StatusResolution::confirmed(PaymentStatus::Paid, Some("TXN-A".into())),
        amount: Some(12.50),
        timestamp: Some(1_700_000_000),
    };

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["fingerprint"], "aaa");
    assert_eq!(value["status"], "PAID");
    assert_eq!(value["synthetic"], false);
    assert_eq!(value["transaction_id"], "TXN-A");
    assert_eq!(value["amount"], 12.50);
}
