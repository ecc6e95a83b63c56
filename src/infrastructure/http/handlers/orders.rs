//! Order HTTP handlers

use std::sync::Arc;
use std::time::Instant;

use validator::Validate;
use warp::Reply;

use crate::application::services::{OrderService, PlaceOrderRequest};
use crate::infrastructure::http::handlers::{error_response, success_response};
use crate::infrastructure::http::models::{
    AttachProofRequest, OrderResponse, OrderView, PollPaymentResponse, RequestContext,
    ReviewRequest,
};
use crate::middleware::RateLimitMiddleware;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

pub async fn handle_place_order(
    body: PlaceOrderRequest,
    client_ip: Option<String>,
    service: Arc<OrderService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "orders.place");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.place_order(&body).await {
        Ok(order) => success_response(&context, started, &OrderResponse::from_order(&order)),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_get_order(
    order_id: String,
    client_ip: Option<String>,
    service: Arc<OrderService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "orders.get");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.get_order(&order_id).await {
        Ok(order) => success_response(&context, started, &OrderResponse::from_order(&order)),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_poll_payment(
    order_id: String,
    client_ip: Option<String>,
    service: Arc<OrderService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "orders.poll_payment");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.poll_payment(&order_id).await {
        Ok(outcome) => success_response(
            &context,
            started,
            &PollPaymentResponse {
                success: true,
                status: outcome.resolution.status,
                synthetic: outcome.resolution.synthetic,
                order: OrderView::from_order(&outcome.order),
            },
        ),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_attach_proof(
    order_id: String,
    body: AttachProofRequest,
    client_ip: Option<String>,
    service: Arc<OrderService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "orders.attach_proof");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    if let Err(e) = body.validate() {
        let error = AppError::InvalidRequest(format!("request validation failed: {}", e));
        return Ok(error_response(&context, started, &error));
    }

    let response = match service.attach_proof(&order_id, &body.transaction_image).await {
        Ok(order) => success_response(&context, started, &OrderResponse::from_order(&order)),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}

pub async fn handle_review(
    order_id: String,
    body: ReviewRequest,
    client_ip: Option<String>,
    service: Arc<OrderService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "orders.review");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.review(&order_id, body.action).await {
        Ok(order) => success_response(&context, started, &OrderResponse::from_order(&order)),
        Err(e) => error_response(&context, started, &e),
    };
    Ok(response)
}
