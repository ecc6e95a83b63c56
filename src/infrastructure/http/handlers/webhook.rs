//! Webhook HTTP handler

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use warp::Reply;

use crate::application::services::WebhookService;
use crate::infrastructure::http::handlers::{error_response, success_response};
use crate::infrastructure::http::models::{RequestContext, WebhookResponse};
use crate::middleware::RateLimitMiddleware;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

pub async fn handle_webhook(
    body: Bytes,
    signature: Option<String>,
    client_ip: Option<String>,
    service: Arc<WebhookService>,
    rate_limiter: Arc<RateLimitMiddleware>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let context = RequestContext::new(client_ip, "bakong.webhook");
    if let Err(e) = rate_limiter.check(&context.client_ip) {
        return Ok(error_response(&context, started, &e));
    }
    LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);

    let response = match service.ingest(&body, signature.as_deref()).await {
        Ok(outcome) => success_response(
            &context,
            started,
            &WebhookResponse {
                success: true,
                order_id: outcome.order_id,
                status: outcome.status,
                changed: outcome.changed,
            },
        ),
        Err(e) => {
            if matches!(e, AppError::Authentication(_)) {
                LoggingUtils::log_auth_failure(
                    &context.operation,
                    &e.to_string(),
                    &context.client_ip,
                );
            }
            error_response(&context, started, &e)
        }
    };
    Ok(response)
}
