//! Payment routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::{IntentService, StatusService};
use crate::config::AppConfig;
use crate::infrastructure::adapters::IntentStore;
use crate::infrastructure::http::handlers::{
    handle_bulk_check, handle_check_payment, handle_generate_qr, handle_get_qr,
    handle_payment_info,
};
use crate::middleware::RateLimitMiddleware;

pub struct PaymentRoutes;

impl PaymentRoutes {
    pub fn create_routes(
        config: AppConfig,
        intent_service: Arc<IntentService>,
        status_service: Arc<StatusService>,
        intent_store: IntentStore,
        rate_limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let body_limit = config.server.max_request_size as u64;

        let generate_qr = warp::path("bakong")
            .and(warp::path("generate-qr"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_intent_service(intent_service))
            .and(Self::with_intent_store(intent_store.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_generate_qr);

        let get_qr = warp::path("bakong")
            .and(warp::path("qr"))
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and(warp::get())
            .and(Self::with_client_ip())
            .and(Self::with_intent_store(intent_store))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_get_qr);

        let check_payment = warp::path("bakong")
            .and(warp::path("check-payment"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_status_service(status_service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_check_payment);

        let bulk_check = warp::path("bakong")
            .and(warp::path("check-bulk-payment"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_status_service(status_service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_bulk_check);

        let payment_info = warp::path("bakong")
            .and(warp::path("payment-info"))
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and(warp::get())
            .and(Self::with_client_ip())
            .and(Self::with_status_service(status_service))
            .and(Self::with_rate_limiter(rate_limiter))
            .and_then(handle_payment_info);

        generate_qr
            .or(get_qr)
            .or(check_payment)
            .or(bulk_check)
            .or(payment_info)
    }

    fn with_client_ip(
    ) -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
        warp::header::optional::<String>("x-forwarded-for")
    }

    fn with_intent_service(
        service: Arc<IntentService>,
    ) -> impl Filter<Extract = (Arc<IntentService>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || service.clone())
    }

    fn with_status_service(
        service: Arc<StatusService>,
    ) -> impl Filter<Extract = (Arc<StatusService>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || service.clone())
    }

    fn with_intent_store(
        store: IntentStore,
    ) -> impl Filter<Extract = (IntentStore,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || store.clone())
    }

    fn with_rate_limiter(
        limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || limiter.clone())
    }
}
