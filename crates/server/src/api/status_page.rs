//! Public status page endpoints.
//!
//! - `/status/{slug}` and `/` (custom domain) - server-rendered SPA shell
//! - `/api/status-page/{slug}` - the payload the shell is hydrated with
//! - `/api/status-page/{slug}/manifest.json` - web app manifest

use crate::AppResources;
use crate::status_page::{
    self, Manifest, StatusPageData, find_by_slug, get_status_page_data, normalize_slug,
    render_status_page,
};
use axum::{
    Extension, Json,
    extract::Path,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use hyper::StatusCode;
use serde_json::json;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const STATUS_PAGE_TAG: &str = "Status Page API";

/// HTML routes. They are not part of the API description.
pub fn html_router() -> axum::Router {
    axum::Router::new()
        .route("/", get(domain_root))
        .route("/status", get(default_status_page))
        .route("/status/", get(default_status_page))
        .route("/status/{slug}", get(status_page_by_slug))
}

/// JSON routes, nested under `/api/status-page`.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(status_page_data))
        .routes(routes!(manifest))
}

/// Render `slug` into the shell, or answer with the plain shell and 404.
#[tracing::instrument(skip(resources))]
pub async fn serve_status_page(resources: &AppResources, slug: &str) -> Response {
    let slug = normalize_slug(slug, &resources.config.default_slug);
    let db = resources.db.as_ref();

    let page = match find_by_slug(db, slug).await {
        Ok(Some(page)) => page,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html(resources.index_html.to_string()),
            )
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    match render_status_page(db, resources.maintenance.as_ref(), &resources.index_html, &page).await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn default_status_page(Extension(resources): Extension<AppResources>) -> Response {
    serve_status_page(&resources, "").await
}

async fn status_page_by_slug(
    Extension(resources): Extension<AppResources>,
    Path(slug): Path<String>,
) -> Response {
    serve_status_page(&resources, &slug).await
}

/// Requests for a custom domain render the status page mapped to it.
#[tracing::instrument(skip_all)]
async fn domain_root(Extension(resources): Extension<AppResources>, headers: HeaderMap) -> Response {
    let slug = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|host| resources.domains.resolve(host));

    match slug {
        Some(slug) => serve_status_page(&resources, &slug).await,
        None => Html(resources.index_html.to_string()).into_response(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"msg": "Not Found"}))).into_response()
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/{slug}",
    tag = STATUS_PAGE_TAG,
    operation_id = "Status Page Data",
    summary = "Everything a status page shows",
    description = "Public config, pinned incident, active maintenance windows and public monitor groups of one status page.",
    params(("slug" = String, Path, description = "Status page slug")),
    responses(
        (status = 200, description = "Status page payload", body = StatusPageData),
        (status = 404, description = "No status page with this slug", content_type = "application/json", example = json!({"msg": "Not Found"})),
        (status = 500, description = "Database failure", content_type = "application/json")
    )
)]
async fn status_page_data(
    Extension(resources): Extension<AppResources>,
    Path(slug): Path<String>,
) -> Response {
    let slug = normalize_slug(&slug, &resources.config.default_slug);
    let db = resources.db.as_ref();
    match find_by_slug(db, slug).await {
        Ok(Some(page)) => {
            match get_status_page_data(db, resources.maintenance.as_ref(), &page).await {
                Ok(data) => Json(data).into_response(),
                Err(e) => e.into_response(),
            }
        }
        Ok(None) => not_found(),
        Err(e) => e.into_response(),
    }
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/{slug}/manifest.json",
    tag = STATUS_PAGE_TAG,
    operation_id = "Status Page Manifest",
    summary = "Web app manifest of a status page",
    params(("slug" = String, Path, description = "Status page slug")),
    responses(
        (status = 200, description = "Manifest", body = Manifest),
        (status = 404, description = "No status page with this slug", content_type = "application/json")
    )
)]
async fn manifest(
    Extension(resources): Extension<AppResources>,
    Path(slug): Path<String>,
) -> Response {
    match status_page::find_by_slug(resources.db.as_ref(), &slug).await {
        Ok(Some(page)) => Json(Manifest::from(&page)).into_response(),
        Ok(None) => not_found(),
        Err(e) => e.into_response(),
    }
}
