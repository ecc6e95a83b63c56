//! Metrics routes

use std::sync::Arc;
use warp::Filter;

use crate::infrastructure::http::handlers::handle_metrics;
use crate::shared::metrics::PaymentMetrics;

pub struct MetricsRoutes;

impl MetricsRoutes {
    pub fn create_routes(
        metrics: Arc<PaymentMetrics>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(Self::with_metrics(metrics))
            .and_then(handle_metrics)
    }

    fn with_metrics(
        metrics: Arc<PaymentMetrics>,
    ) -> impl Filter<Extract = (Arc<PaymentMetrics>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || metrics.clone())
    }
}
