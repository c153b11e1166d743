//! Admin endpoints, nested under `/api/admin`.
//!
//! Every handler requires `Authorization: Bearer <admin_token>`. Without a
//! configured token they all answer 404.

use crate::AppResources;
use crate::api::auth::AdminAuth;
use crate::entity::{monitor, monitor_tag, tag};
use crate::error::StatusPageError;
use crate::heartbeat::{Heartbeat, TlsInfo};
use crate::notification::{self, Notification};
use crate::status_page::{AdminStatusPage, list_status_pages, slug_to_id, update_domain_name_list};
use axum::{
    Extension, Json,
    extract::Path,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ADMIN_TAG: &str = "Admin API";

/// Message sent by the notification test endpoint.
pub const TEST_MESSAGE: &str = "Status Page Testing";

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(status_pages))
        .routes(routes!(update_domain_names))
        .routes(routes!(test_notification))
        .routes(routes!(ingest_heartbeat))
        .routes(routes!(remove_monitor_metrics))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct DomainNamesUpdated {
    ok: bool,
    domain_name_list: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
struct TestNotification {
    notification: Notification,
}

#[derive(Debug, Serialize, ToSchema)]
struct SendResult {
    ok: bool,
    msg: String,
}

/// Latest probe results of one monitor. Either part may be omitted.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProbeReport {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    heartbeat: Option<Heartbeat>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    tls_info: Option<TlsInfo>,
}

#[tracing::instrument(skip(resources, _auth))]
#[utoipa::path(
    get,
    path = "/status-pages",
    tag = ADMIN_TAG,
    operation_id = "List Status Pages",
    summary = "All status pages keyed by id",
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Status pages, read in title order", body = BTreeMap<i32, AdminStatusPage>),
        (status = 401, description = "Missing or wrong admin token")
    )
)]
async fn status_pages(
    _auth: AdminAuth,
    Extension(resources): Extension<AppResources>,
) -> Result<Json<BTreeMap<i32, AdminStatusPage>>, StatusPageError> {
    Ok(Json(
        list_status_pages(resources.db.as_ref(), &resources.domains).await?,
    ))
}

#[tracing::instrument(skip(resources, _auth, payload))]
#[utoipa::path(
    put,
    path = "/status-pages/{slug}/domain-names",
    tag = ADMIN_TAG,
    operation_id = "Update Status Page Domains",
    summary = "Replace the custom domains of a status page",
    description = "Domains claimed here are taken away from any other status page. \
                   The whole list is rejected if one entry is invalid.",
    security(("admin_token" = [])),
    params(("slug" = String, Path, description = "Status page slug")),
    request_body(content = Vec<String>, description = "Domain names", example = json!(["status.example.org"])),
    responses(
        (status = 200, description = "Domains stored", body = DomainNamesUpdated),
        (status = 400, description = "Not an array, or an invalid entry", content_type = "application/json"),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 404, description = "No status page with this slug", content_type = "application/json")
    )
)]
async fn update_domain_names(
    _auth: AdminAuth,
    Extension(resources): Extension<AppResources>,
    Path(slug): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<DomainNamesUpdated>, StatusPageError> {
    let db = resources.db.as_ref();
    let id = slug_to_id(db, &slug)
        .await?
        .ok_or_else(|| StatusPageError::NotFound(slug.clone()))?;

    let stored = update_domain_name_list(db, id, &payload).await?;
    // Already committed. A failed refresh leaves the cache stale until the next one.
    if let Err(e) = resources.domains.refresh(db).await {
        tracing::error!(
            name = "api.admin.domain_refresh_failed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            error = %e,
            status_page_id = id,
            message = "Domain list stored but the domain cache was not refreshed"
        );
    }

    Ok(Json(DomainNamesUpdated {
        ok: true,
        domain_name_list: stored,
    }))
}

#[tracing::instrument(skip(resources, _auth, payload), fields(provider = %payload.notification.provider))]
#[utoipa::path(
    post,
    path = "/notifications/test",
    tag = ADMIN_TAG,
    operation_id = "Test Notification",
    summary = "Send a test message through a notification provider",
    security(("admin_token" = [])),
    request_body(content = TestNotification, example = json!({"notification": {"type": "WeCom", "weComBotKey": "..."}})),
    responses(
        (status = 200, description = "Provider accepted the message", body = SendResult),
        (status = 400, description = "Unknown provider or incomplete config", content_type = "application/json"),
        (status = 502, description = "Provider rejected the message", content_type = "application/json")
    )
)]
async fn test_notification(
    _auth: AdminAuth,
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<TestNotification>,
) -> Response {
    match notification::dispatch(
        resources.http.clone(),
        &payload.notification,
        TEST_MESSAGE,
        None,
        None,
    )
    .await
    {
        Ok(msg) => Json(SendResult { ok: true, msg }).into_response(),
        Err(e) => {
            tracing::warn!(
                name = "api.admin.test_notification_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Test notification failed"
            );
            e.into_response()
        }
    }
}

#[tracing::instrument(skip(resources, _auth, report))]
#[utoipa::path(
    post,
    path = "/monitors/{id}/heartbeat",
    tag = ADMIN_TAG,
    operation_id = "Report Probe Result",
    summary = "Feed a heartbeat and TLS info into the monitor gauges",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Monitor id")),
    request_body(content = ProbeReport, example = json!({"heartbeat": {"status": 1, "ping": 42}, "tlsInfo": {"valid": true, "certInfo": {"daysRemaining": 30}}})),
    responses(
        (status = 204, description = "Gauges updated"),
        (status = 404, description = "Unknown monitor, or metrics disabled", content_type = "application/json")
    )
)]
async fn ingest_heartbeat(
    _auth: AdminAuth,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    Json(report): Json<ProbeReport>,
) -> Result<StatusCode, StatusPageError> {
    if !resources.config.metrics.enabled {
        return Err(StatusPageError::NotFound("metrics are disabled".into()));
    }
    let db = resources.db.as_ref();
    let monitor = monitor::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StatusPageError::NotFound(format!("monitor {id}")))?;

    let tags: Vec<(String, String)> = monitor_tag::Entity::find()
        .filter(monitor_tag::Column::MonitorId.eq(id))
        .order_by_asc(monitor_tag::Column::Id)
        .find_also_related(tag::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(mt, t)| t.map(|t| (t.name, mt.value)))
        .collect();

    resources
        .monitor_metrics
        .record(
            resources.metrics,
            &monitor,
            &tags,
            report.heartbeat.as_ref(),
            report.tls_info.as_ref(),
        )
        .map_err(|e| StatusPageError::InvalidInput(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(resources, _auth))]
#[utoipa::path(
    delete,
    path = "/monitors/{id}/metrics",
    tag = ADMIN_TAG,
    operation_id = "Remove Monitor Metrics",
    summary = "Drop every series of a monitor",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Monitor id")),
    responses(
        (status = 200, description = "Series removed (or none existed)", content_type = "application/json", example = json!({"ok": true, "removed": true}))
    )
)]
async fn remove_monitor_metrics(
    _auth: AdminAuth,
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Json<serde_json::Value> {
    let removed = resources.monitor_metrics.remove(id);
    Json(json!({"ok": true, "removed": removed}))
}
