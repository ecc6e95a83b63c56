//! Payment HTTP handlers

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;
use validator::Validate;
use warp::Reply;

use crate::application::services::{CreateIntentRequest, IntentService, StatusService};
use crate::infrastructure::adapters::IntentStore;
use crate::infrastructure::http::handlers::{error_response, success_response};
use crate::infrastructure::http::models::{
    BulkCheckRequest, BulkCheckResponse, CheckPaymentRequest, CheckPaymentResponse,
    GenerateQrRequest, GenerateQrResponse, RequestContext,
};
use crate::middleware::RateLimitMiddleware;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

pub async fn handle_generate_qr(
    body: GenerateQrRequest,
    client_ip: Option<String>,
    service: Arc<IntentService>,
    intents: IntentStore,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.generate_qr");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    if let Err(e) = body.validate() {
        let error = AppError::InvalidRequest(format!("request validation failed: {}", e));
        return Ok(error_response(&context, started, &error));
    }

    let request = CreateIntentRequest {
        amount: body.amount,
        currency: body.currency,
        bill_number: body.bill_number,
    };

    let response = match service.create_intent(&request) {
        Ok(intent) => {
            // Cache failures must not lose the QR the customer is looking at
            if let Err(e) = intents.put(&intent).await {
                warn!(fingerprint = %intent.fingerprint, "Failed to cache intent: {}", e);
            }
            success_response(&context, started, &GenerateQrResponse::from_intent(&intent))
        }
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_get_qr(
    md5: String,
    client_ip: Option<String>,
    intents: IntentStore,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.get_qr");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match intents.get(&md5).await {
        Ok(Some(intent)) => {
            success_response(&context, started, &GenerateQrResponse::from_intent(&intent))
        }
        Ok(None) => {
            let error = AppError::NotFound(format!("no payment intent for {}", md5));
            error_response(&context, started, &error)
        }
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_check_payment(
    body: CheckPaymentRequest,
    client_ip: Option<String>,
    service: Arc<StatusService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.check_payment");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.check_one(&body.md5_hash).await {
        Ok(resolution) => success_response(
            &context,
            started,
            &CheckPaymentResponse {
                success: true,
                status: resolution.status,
                is_paid: resolution.is_authoritative_paid(),
                synthetic: resolution.synthetic,
                transaction_id: resolution.transaction_id,
            },
        ),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_bulk_check(
    body: BulkCheckRequest,
    client_ip: Option<String>,
    service: Arc<StatusService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.check_bulk_payment");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.check_batch(&body.md5_hashes).await {
        Ok(entries) => success_response(&context, started, &BulkCheckResponse::from_entries(entries)),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_payment_info(
    md5: String,
    client_ip: Option<String>,
    service: Arc<StatusService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.payment_info");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.payment_info(&md5).await {
        Ok(info) => success_response(
            &context,
            started,
            &serde_json::json!({ "success": true, "data": info }),
        ),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}
