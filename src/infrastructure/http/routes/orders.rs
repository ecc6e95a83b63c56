//! Order routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::OrderService;
use crate::config::AppConfig;
use crate::infrastructure::http::handlers::{
    handle_attach_proof, handle_get_order, handle_place_order, handle_poll_payment, handle_review,
};
use crate::middleware::RateLimitMiddleware;

pub struct OrderRoutes;

impl OrderRoutes {
    pub fn create_routes(
        config: AppConfig,
        service: Arc<OrderService>,
        rate_limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let body_limit = config.server.max_request_size as u64;

        let place = warp::path("orders")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_service(service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_place_order);

        let get = warp::path("orders")
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and(warp::get())
            .and(Self::with_client_ip())
            .and(Self::with_service(service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_get_order);

        let poll = warp::path("orders")
            .and(warp::path::param::<String>())
            .and(warp::path("poll-payment"))
            .and(warp::path::end())
            .and(warp::post())
            .and(Self::with_client_ip())
            .and(Self::with_service(service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_poll_payment);

        let proof = warp::path("orders")
            .and(warp::path::param::<String>())
            .and(warp::path("proof"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_service(service.clone()))
            .and(Self::with_rate_limiter(rate_limiter.clone()))
            .and_then(handle_attach_proof);

        let review = warp::path("orders")
            .and(warp::path::param::<String>())
            .and(warp::path("review"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::json())
            .and(Self::with_client_ip())
            .and(Self::with_service(service))
            .and(Self::with_rate_limiter(rate_limiter))
            .and_then(handle_review);

        place.or(poll).or(proof).or(review).or(get)
    }

    fn with_client_ip(
    ) -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
        warp::header::optional::<String>("x-forwarded-for")
    }

    fn with_service(
        service: Arc<OrderService>,
    ) -> impl Filter<Extract = (Arc<OrderService>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || service.clone())
    }

    fn with_rate_limiter(
        limiter: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || limiter.clone())
    }
}
