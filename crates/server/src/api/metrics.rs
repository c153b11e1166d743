//! Prometheus metrics endpoint.

use crate::AppResources;
use crate::api::health::MISC_TAG;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Per-monitor gauges in the text exposition format.
#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/metrics",
    tag = MISC_TAG,
    operation_id = "Prometheus Metrics",
    responses(
        (status = 200, description = "Prometheus metrics in text exposition format", body = String, content_type = "text/plain"),
        (status = 404, description = "Metrics disabled via configuration")
    )
)]
pub async fn metrics(axum::Extension(resources): axum::Extension<AppResources>) -> Response {
    if !resources.config.metrics.enabled {
        return (StatusCode::NOT_FOUND, String::new()).into_response();
    }
    match resources.metrics.encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!(
                name = "api.metrics.encode_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to encode metrics"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response()
        }
    }
}
