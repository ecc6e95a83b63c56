//! Health check HTTP handler

use std::sync::Arc;

use warp::Reply;

use crate::config::AppConfig;
use crate::middleware::json_response_with_security_headers;

/// Liveness plus a coarse readiness signal: without an upstream token every
/// settlement check is doomed, so the service reports itself as degraded.
pub async fn handle_health(
    config: Arc<AppConfig>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let upstream_configured = config.upstream_configured();
    let status = if upstream_configured { "ok" } else { "degraded" };

    let body = serde_json::json!({
        "status": status,
        "upstream_configured": upstream_configured,
        "fallback_enabled": config.fallback.enabled,
        "version": env!("CARGO_PKG_VERSION"),
    });

    Ok(warp::reply::with_status(
        json_response_with_security_headers(&body),
        warp::http::StatusCode::OK,
    ))
}
