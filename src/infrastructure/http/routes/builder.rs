//! Route builder module
//!
//! Composes all route groups into the single filter served by the server
//! and maps stray rejections onto the JSON error envelope.

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::application::services::{IntentService, OrderService, StatusService, WebhookService};
use crate::config::AppConfig;
use crate::infrastructure::adapters::IntentStore;
use crate::infrastructure::http::routes::{
    HealthRoutes, MetricsRoutes, OrderRoutes, PaymentRoutes, WebhookRoutes,
};
use crate::middleware::{json_response_with_security_headers, RateLimitMiddleware};
use crate::shared::error::AppError;
use crate::shared::metrics::PaymentMetrics;

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn build_routes(
        config: AppConfig,
        intent_service: Arc<IntentService>,
        status_service: Arc<StatusService>,
        order_service: Arc<OrderService>,
        webhook_service: Arc<WebhookService>,
        intent_store: IntentStore,
        metrics: Arc<PaymentMetrics>,
        rate_limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        let payment_routes = PaymentRoutes::create_routes(
            config.clone(),
            intent_service,
            status_service,
            intent_store,
            rate_limiter.clone(),
        );

        let webhook_routes = WebhookRoutes::create_routes(
            config.clone(),
            webhook_service,
            rate_limiter.clone(),
        );

        let order_routes = OrderRoutes::create_routes(config.clone(), order_service, rate_limiter);

        let health_routes = HealthRoutes::create_routes(Arc::new(config));

        let metrics_routes = MetricsRoutes::create_routes(metrics);

        payment_routes
            .or(webhook_routes)
            .or(order_routes)
            .or(health_routes)
            .or(metrics_routes)
            .recover(handle_rejection)
    }
}

/// Map rejections the filters produced themselves (bad JSON, missing
/// routes, oversized bodies) onto the same error envelope the handlers use.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "resource not found".to_string())
    } else if let Some(app_error) = err.find::<AppError>() {
        return Ok(warp::reply::with_status(
            json_response_with_security_headers(&app_error.to_error_body()),
            app_error.http_status_code(),
        ));
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("malformed body: {}", e))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        )
    };

    let body = serde_json::json!({ "success": false, "message": message });
    Ok(warp::reply::with_status(
        json_response_with_security_headers(&body),
        status,
    ))
}
