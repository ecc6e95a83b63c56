//! Metrics HTTP handler

use std::sync::Arc;
use std::time::Instant;

use warp::http::StatusCode;
use warp::Reply;

use crate::infrastructure::http::handlers::error_response;
use crate::infrastructure::http::models::RequestContext;
use crate::shared::metrics::PaymentMetrics;

pub async fn handle_metrics(
    metrics: Arc<PaymentMetrics>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let started = Instant::now();
    let response = match metrics.render() {
        Ok(text) => warp::reply::with_status(
            warp::reply::with_header(text, "content-type", "text/plain; version=0.0.4")
                .into_response(),
            StatusCode::OK,
        ),
        Err(e) => {
            let context = RequestContext::new(None, "metrics");
            error_response(&context, started, &e)
        }
    };
    Ok(response)
}
