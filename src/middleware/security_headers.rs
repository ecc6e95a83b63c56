//! Security headers for JSON responses
//!
//! The service runs behind a reverse proxy that owns TLS and CORS; the
//! conservative browser-facing headers are still set here so responses are
//! safe even when fetched directly.

use serde::Serialize;
use warp::http::header::{HeaderValue, CACHE_CONTROL, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use warp::reply::Response;
use warp::Reply;

/// Serialize a body to JSON and attach the standard security headers
pub fn json_response_with_security_headers<T: Serialize>(body: &T) -> Response {
    let mut response = warp::reply::json(body).into_response();
    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
