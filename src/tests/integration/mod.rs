//! HTTP integration tests
//!
//! Run the full filter stack (routes, handlers, services, stores) against
//! the programmable mock network, asserting on wire-level status codes and
//! response bodies.

use std::convert::Infallible;
use std::sync::Arc;

use serde_json::{json, Value};
use warp::{Filter, Reply};

use crate::config::AppConfig;
use crate::infrastructure::adapters::HmacSignatureVerifier;
use crate::infrastructure::http::PaymentServer;
use crate::tests::common::MockPaymentNetwork;
use crate::tests::config::{fallback_test_config, test_config, TEST_WEBHOOK_SECRET};

async fn test_routes(
    config: AppConfig,
    network: MockPaymentNetwork,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    PaymentServer::with_network(config, Arc::new(network))
        .await
        .expect("server construction")
        .create_routes()
}

fn body_json(response: &warp::http::Response<bytes::Bytes>) -> Value {
    serde_json::from_slice(response.body()).expect("JSON response body")
}

fn sign(body: &[u8]) -> String {
    HmacSignatureVerifier::new(TEST_WEBHOOK_SECRET).sign(body)
}

#[tokio::test]
async fn test_generate_qr_is_deterministic_over_http() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;
    let request = json!({ "amount": 12.50, "currency": "USD", "bill_number": "BILL100" });

    let first = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&request)
        .reply(&routes)
        .await;
    assert_eq!(first.status(), 200);

    let second = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&request)
        .reply(&routes)
        .await;
    assert_eq!(second.status(), 200);

    let first = body_json(&first);
    let second = body_json(&second);
    assert_eq!(first["success"], true);
    assert!(first["qr_string"].as_str().unwrap().starts_with("000201"));
    assert_eq!(first["md5_hash"].as_str().unwrap().len(), 32);
    assert_eq!(first["md5_hash"], second["md5_hash"]);
}

#[tokio::test]
async fn test_generate_qr_rejects_invalid_amount() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&json!({ "amount": -5.0, "currency": "USD", "bill_number": "B1" }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(body_json(&response)["success"], false);
}

#[tokio::test]
async fn test_cached_qr_can_be_refetched_by_fingerprint() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let created = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&json!({ "amount": 12.50, "currency": "USD", "bill_number": "BILL100" }))
        .reply(&routes)
        .await;
    assert_eq!(created.status(), 200);
    let created = body_json(&created);
    let fingerprint = created["md5_hash"].as_str().unwrap();

    let fetched = warp::test::request()
        .method("GET")
        .path(&format!("/bakong/qr/{}", fingerprint))
        .reply(&routes)
        .await;
    assert_eq!(fetched.status(), 200);
    let fetched = body_json(&fetched);
    assert_eq!(fetched["qr_string"], created["qr_string"]);
    assert_eq!(fetched["md5_hash"], created["md5_hash"]);

    let missing = warp::test::request()
        .method("GET")
        .path("/bakong/qr/ffffffffffffffffffffffffffffffff")
        .reply(&routes)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_order_settles_via_signed_webhook() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    // Create the intent so the fingerprint is real
    let qr = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&json!({ "amount": 12.50, "currency": "USD", "bill_number": "BILL100" }))
        .reply(&routes)
        .await;
    let fingerprint = body_json(&qr)["md5_hash"].as_str().unwrap().to_string();

    // Place the order holding that fingerprint
    let placed = warp::test::request()
        .method("POST")
        .path("/orders")
        .json(&json!({
            "amount": 12.50,
            "currency": "USD",
            "bill_number": "BILL100",
            "payment_method": "BAKONG",
            "transaction_id": fingerprint,
        }))
        .reply(&routes)
        .await;
    assert_eq!(placed.status(), 200);
    let order_id = body_json(&placed)["order"]["order_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Deliver a signed settlement webhook
    let webhook_body =
        format!(r#"{{"md5_hash":"{}","status":"PAID","transaction_id":"TXN-1"}}"#, fingerprint);
    let delivered = warp::test::request()
        .method("POST")
        .path("/bakong/webhook")
        .header("x-bakong-signature", sign(webhook_body.as_bytes()))
        .body(webhook_body.clone())
        .reply(&routes)
        .await;
    assert_eq!(delivered.status(), 200);
    let delivered = body_json(&delivered);
    assert_eq!(delivered["changed"], true);
    assert_eq!(delivered["order_id"].as_str().unwrap(), order_id);

    // The order is now paid; confirmation stays not-applicable for QR
    let fetched = warp::test::request()
        .method("GET")
        .path(&format!("/orders/{}", order_id))
        .reply(&routes)
        .await;
    let fetched = body_json(&fetched);
    assert_eq!(fetched["order"]["payment_status"], "paid");
    assert_eq!(fetched["order"]["confirmation_status"], "na");

    // Redelivery is an idempotent no-op
    let replayed = warp::test::request()
        .method("POST")
        .path("/bakong/webhook")
        .header("x-bakong-signature", sign(webhook_body.as_bytes()))
        .body(webhook_body)
        .reply(&routes)
        .await;
    assert_eq!(replayed.status(), 200);
    assert_eq!(body_json(&replayed)["changed"], false);
}

#[tokio::test]
async fn test_webhook_without_signature_is_rejected() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/webhook")
        .body(r#"{"md5_hash":"abc123","status":"PAID"}"#)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(body_json(&response)["success"], false);
}

#[tokio::test]
async fn test_bulk_check_empty_is_bad_request() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/check-bulk-payment")
        .json(&json!({ "md5_hashes": [] }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_bulk_check_reports_paid_and_synthetic_entries() {
    let network = MockPaymentNetwork::new().with_paid("aaa", "TXN-A");
    let routes = test_routes(test_config(), network).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/check-bulk-payment")
        .json(&json!({ "md5_hashes": ["aaa", "zzz"] }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body = body_json(&response);
    assert_eq!(body["total_checked"], 2);
    assert_eq!(body["paid_count"], 1);
    assert_eq!(body["paid_transactions"][0], "aaa");
    assert_eq!(body["payment_details"][0]["status"], "PAID");
    // the fingerprint the upstream knows nothing about is tagged, not paid
    assert_eq!(body["payment_details"][1]["synthetic"], true);
    assert_eq!(body["payment_details"][1]["status"], "UNKNOWN");
}

#[tokio::test]
async fn test_check_payment_outage_without_fallback_is_503() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new().with_outage()).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/check-payment")
        .json(&json!({ "md5_hash": "abc123" }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_poll_during_outage_is_synthetic_and_never_fulfills() {
    let routes = test_routes(fallback_test_config(), MockPaymentNetwork::new().with_outage()).await;

    let placed = warp::test::request()
        .method("POST")
        .path("/orders")
        .json(&json!({
            "amount": 12.50,
            "currency": "USD",
            "bill_number": "BILL100",
            "payment_method": "BAKONG",
            "transaction_id": "abc123",
        }))
        .reply(&routes)
        .await;
    let order_id = body_json(&placed)["order"]["order_id"]
        .as_str()
        .unwrap()
        .to_string();

    let polled = warp::test::request()
        .method("POST")
        .path(&format!("/orders/{}/poll-payment", order_id))
        .reply(&routes)
        .await;
    assert_eq!(polled.status(), 200);
    let polled = body_json(&polled);
    assert_eq!(polled["synthetic"], true);
    assert_eq!(polled["status"], "UNKNOWN");
    // the fallback result did not move the order
    assert_eq!(polled["order"]["payment_status"], "pending");
}

#[tokio::test]
async fn test_transfer_proof_and_review_over_http() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let placed = warp::test::request()
        .method("POST")
        .path("/orders")
        .json(&json!({
            "amount": 30.0,
            "currency": "USD",
            "bill_number": "BILL200",
            "payment_method": "ABA",
        }))
        .reply(&routes)
        .await;
    let order_id = body_json(&placed)["order"]["order_id"]
        .as_str()
        .unwrap()
        .to_string();

    let with_proof = warp::test::request()
        .method("POST")
        .path(&format!("/orders/{}/proof", order_id))
        .json(&json!({ "transaction_image": "uploads/proof-1.jpg" }))
        .reply(&routes)
        .await;
    assert_eq!(with_proof.status(), 200);
    assert_eq!(
        body_json(&with_proof)["order"]["payment_status"],
        "pending_confirmation"
    );

    let reviewed = warp::test::request()
        .method("POST")
        .path(&format!("/orders/{}/review", order_id))
        .json(&json!({ "action": "confirm" }))
        .reply(&routes)
        .await;
    assert_eq!(reviewed.status(), 200);
    let reviewed = body_json(&reviewed);
    assert_eq!(reviewed["order"]["payment_status"], "paid");
    assert_eq!(reviewed["order"]["confirmation_status"], "confirmed");
}

#[tokio::test]
async fn test_payment_info_passthrough_and_not_found() {
    let network = MockPaymentNetwork::new().with_paid("aaa", "TXN-A");
    let routes = test_routes(test_config(), network).await;

    let found = warp::test::request()
        .method("GET")
        .path("/bakong/payment-info/aaa")
        .reply(&routes)
        .await;
    assert_eq!(found.status(), 200);
    assert_eq!(body_json(&found)["data"]["status"], "PAID");

    let missing = warp::test::request()
        .method("GET")
        .path("/bakong/payment-info/zzz")
        .reply(&routes)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_health_reports_degraded_without_upstream_token() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["upstream_configured"], false);
}

#[tokio::test]
async fn test_metrics_endpoint_renders_prometheus_text() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    // touch a counter first
    warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .json(&json!({ "amount": 1.0, "currency": "USD", "bill_number": "B1" }))
        .reply(&routes)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path("/metrics")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);
    let text = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(text.contains("khqr_intents_created_total"));
}

#[tokio::test]
async fn test_unknown_route_gets_json_error_envelope() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(body_json(&response)["success"], false);
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let routes = test_routes(test_config(), MockPaymentNetwork::new()).await;

    let response = warp::test::request()
        .method("POST")
        .path("/bakong/generate-qr")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);
}
