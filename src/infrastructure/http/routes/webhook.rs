//! Webhook routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::WebhookService;
use crate::config::AppConfig;
use crate::infrastructure::http::handlers::handle_webhook;
use crate::middleware::RateLimitMiddleware;

pub struct WebhookRoutes;

impl WebhookRoutes {
    pub fn create_routes(
        config: AppConfig,
        service: Arc<WebhookService>,
        rate_limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        // The raw body is required: the signature covers the exact bytes on
        // the wire, not a re-serialized JSON value
        warp::path("bakong")
            .and(warp::path("webhook"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(
                config.server.max_request_size as u64,
            ))
            .and(warp::body::bytes())
            .and(warp::header::optional::<String>("x-bakong-signature"))
            .and(warp::header::optional::<String>("x-forwarded-for"))
            .and(Self::with_service(service))
            .and(Self::with_rate_limiter(rate_limiter))
            .and_then(handle_webhook)
    }

    fn with_service(
        service: Arc<WebhookService>,
    ) -> impl Filter<Extract = (Arc<WebhookService>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || service.clone())
    }

    fn with_rate_limiter(
        limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || limiter.clone())
    }
}
