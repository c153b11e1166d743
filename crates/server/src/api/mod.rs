//! HTTP surface of the status page server.
//!
//! - `status_page` - rendered pages (`/`, `/status/*`) and `/api/status-page/*`
//! - `admin` - token-guarded management endpoints (`/api/admin/*`)
//! - `health` - health check endpoint (`/healthz`)
//! - `metrics` - Prometheus metrics endpoint (`/metrics`)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod admin;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod status_page;

pub use admin::ADMIN_TAG;
pub use health::MISC_TAG;
pub use status_page::STATUS_PAGE_TAG;

use crate::AppResources;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// The complete application router, with resources and middleware attached.
pub fn router(app_resources: AppResources) -> axum::Router {
    let (api_router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/status-page", status_page::router())
        .nest("/api/admin", admin::router())
        .routes(routes!(metrics::metrics))
        .routes(routes!(health::health))
        .split_for_parts();

    api_router
        .merge(status_page::html_router())
        .merge(Redoc::with_url("/api-docs", api))
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until the process ends.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let addr = app_resources.config.listen_addr;
    let router = router(app_resources);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
