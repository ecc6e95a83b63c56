//! HTTP handlers module

pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod webhook;

pub use health::handle_health;
pub use metrics::handle_metrics;
pub use orders::{
    handle_attach_proof, handle_get_order, handle_place_order, handle_poll_payment, handle_review,
};
pub use payments::{
    handle_bulk_check, handle_check_payment, handle_generate_qr, handle_get_qr,
    handle_payment_info,
};
pub use webhook::handle_webhook;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Response, WithStatus};

use crate::infrastructure::http::models::RequestContext;
use crate::middleware::json_response_with_security_headers;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

/// Build the OK reply for a handler and log completion
pub(crate) fn success_response<T: Serialize>(
    context: &RequestContext,
    started: std::time::Instant,
    body: &T,
) -> WithStatus<Response> {
    LoggingUtils::log_success(
        &context.request_id,
        &context.operation,
        started.elapsed().as_millis() as u64,
    );
    warp::reply::with_status(json_response_with_security_headers(body), StatusCode::OK)
}

/// Build the error reply for a handler and log the failure
pub(crate) fn error_response(
    context: &RequestContext,
    started: std::time::Instant,
    error: &AppError,
) -> WithStatus<Response> {
    LoggingUtils::log_error(
        &context.request_id,
        &context.operation,
        error,
        started.elapsed().as_millis() as u64,
    );
    warp::reply::with_status(
        json_response_with_security_headers(&error.to_error_body()),
        error.http_status_code(),
    )
}
