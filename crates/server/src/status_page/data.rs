//! Assembly of the public status page payload.

use super::maintenance::MaintenanceSchedule;
use super::public::{
    PublicGroup, PublicIncident, PublicMaintenance, PublicMonitor, PublicStatusPageConfig,
    PublicTag, StatusPageData,
};
use crate::entity::{
    group, incident, maintenance_status_page, monitor, monitor_group, monitor_tag,
    monitor_tls_info, status_page, tag,
};
use crate::error::StatusPageError;
use crate::heartbeat::TlsInfo;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Monitor types whose certificate is checked by the probe.
const CERT_MONITOR_TYPES: [&str; 3] = ["http", "keyword", "json-query"];

/// Collect config, pinned incident, active maintenance and public groups for one page.
///
/// Only the maintenance lookup degrades silently; any other failed read fails
/// the whole assembly.
#[tracing::instrument(skip(db, schedule, page), fields(slug = %page.slug))]
pub async fn get_status_page_data(
    db: &DatabaseConnection,
    schedule: &dyn MaintenanceSchedule,
    page: &status_page::Model,
) -> Result<StatusPageData, StatusPageError> {
    let config = PublicStatusPageConfig::from(page);
    let incident = pinned_incident(db, page.id).await?;
    let maintenance_list = get_maintenance_list(db, schedule, page.id).await;
    let public_group_list =
        public_group_list(db, page.id, page.show_tags, config.show_certificate_expiry).await?;

    Ok(StatusPageData {
        config,
        incident,
        public_group_list,
        maintenance_list,
    })
}

/// The pinned, active incident of a page.
///
/// Nothing prevents two of them from existing; the lowest id wins then.
pub async fn pinned_incident(
    db: &DatabaseConnection,
    status_page_id: i32,
) -> Result<Option<PublicIncident>, StatusPageError> {
    let found = incident::Entity::find()
        .filter(incident::Column::Pin.eq(true))
        .filter(incident::Column::Active.eq(true))
        .filter(incident::Column::StatusPageId.eq(status_page_id))
        .order_by_asc(incident::Column::Id)
        .one(db)
        .await?;
    Ok(found.map(PublicIncident::from))
}

/// Maintenance windows of a page that are active right now.
///
/// Failures are logged and reported as an empty list.
pub async fn get_maintenance_list(
    db: &DatabaseConnection,
    schedule: &dyn MaintenanceSchedule,
    status_page_id: i32,
) -> Vec<PublicMaintenance> {
    match try_get_maintenance_list(db, schedule, status_page_id).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(
                name = "status_page.get_maintenance_list.failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                status_page_id = status_page_id,
                message = "maintenance lookup failed; reporting no maintenance"
            );
            Vec::new()
        }
    }
}

async fn try_get_maintenance_list(
    db: &DatabaseConnection,
    schedule: &dyn MaintenanceSchedule,
    status_page_id: i32,
) -> Result<Vec<PublicMaintenance>, StatusPageError> {
    let ids: Vec<i32> = maintenance_status_page::Entity::find()
        .select_only()
        .column(maintenance_status_page::Column::MaintenanceId)
        .distinct()
        .filter(maintenance_status_page::Column::StatusPageId.eq(status_page_id))
        .order_by_asc(maintenance_status_page::Column::MaintenanceId)
        .into_tuple()
        .all(db)
        .await?;

    let mut list = Vec::new();
    for id in ids {
        if let Some(m) = schedule.get_maintenance(id).await?
            && schedule.is_under_maintenance(&m).await?
        {
            list.push(PublicMaintenance::under_maintenance(&m));
        }
    }
    Ok(list)
}

/// Public groups of a page by ascending weight, each with its monitors.
pub async fn public_group_list(
    db: &DatabaseConnection,
    status_page_id: i32,
    show_tags: bool,
    show_certificate_expiry: bool,
) -> Result<Vec<PublicGroup>, StatusPageError> {
    let groups = group::Entity::find()
        .filter(group::Column::Public.eq(true))
        .filter(group::Column::StatusPageId.eq(status_page_id))
        .order_by_asc(group::Column::Weight)
        .order_by_asc(group::Column::Id)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(groups.len());
    for g in groups {
        out.push(group_to_public(db, g, show_tags, show_certificate_expiry).await?);
    }
    Ok(out)
}

async fn group_to_public(
    db: &DatabaseConnection,
    g: group::Model,
    show_tags: bool,
    show_certificate_expiry: bool,
) -> Result<PublicGroup, StatusPageError> {
    let members = monitor_group::Entity::find()
        .filter(monitor_group::Column::GroupId.eq(g.id))
        .order_by_asc(monitor_group::Column::Weight)
        .order_by_asc(monitor_group::Column::Id)
        .find_also_related(monitor::Entity)
        .all(db)
        .await?;

    let mut monitor_list = Vec::with_capacity(members.len());
    for (_, m) in members {
        if let Some(m) = m {
            monitor_list.push(monitor_to_public(db, &m, show_tags, show_certificate_expiry).await?);
        }
    }

    Ok(PublicGroup {
        id: g.id,
        name: g.name,
        weight: g.weight,
        monitor_list,
    })
}

/// Public projection of a monitor. Tags and certificate details are only
/// looked up when the page shows them.
pub async fn monitor_to_public(
    db: &DatabaseConnection,
    m: &monitor::Model,
    show_tags: bool,
    show_certificate_expiry: bool,
) -> Result<PublicMonitor, StatusPageError> {
    let mut public = PublicMonitor {
        id: m.id,
        name: m.name.clone(),
        send_url: m.send_url,
        monitor_type: m.monitor_type.clone(),
        url: None,
        tags: None,
        cert_expiry_days_remaining: None,
        valid_cert: None,
    };

    if m.send_url {
        public.url = m.url.clone();
    }

    if show_tags {
        public.tags = Some(monitor_tags(db, m.id).await?);
    }

    if show_certificate_expiry && checks_certificate(m) {
        let (days, valid) = cert_expiry(db, m.id).await?;
        public.cert_expiry_days_remaining = days;
        public.valid_cert = Some(valid);
    }

    Ok(public)
}

/// Tags attached to a monitor, in attachment order.
pub async fn monitor_tags(
    db: &DatabaseConnection,
    monitor_id: i32,
) -> Result<Vec<PublicTag>, StatusPageError> {
    let rows = monitor_tag::Entity::find()
        .filter(monitor_tag::Column::MonitorId.eq(monitor_id))
        .order_by_asc(monitor_tag::Column::Id)
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(mt, t)| {
            t.map(|t| PublicTag {
                tag_id: t.id,
                name: t.name,
                color: t.color,
                value: mt.value,
            })
        })
        .collect())
}

fn checks_certificate(m: &monitor::Model) -> bool {
    CERT_MONITOR_TYPES.contains(&m.monitor_type.as_str())
        && m
            .url
            .as_deref()
            .and_then(|u| url::Url::parse(u).ok())
            .is_some_and(|u| u.scheme() == "https")
}

/// Days until certificate expiry and whether the last probe saw a valid certificate.
async fn cert_expiry(
    db: &DatabaseConnection,
    monitor_id: i32,
) -> Result<(Option<i64>, bool), StatusPageError> {
    let row = monitor_tls_info::Entity::find()
        .filter(monitor_tls_info::Column::MonitorId.eq(monitor_id))
        .one(db)
        .await?;

    let Some(row) = row else {
        return Ok((None, false));
    };

    match serde_json::from_str::<TlsInfo>(&row.info_json) {
        Ok(info) => match info.cert_info {
            Some(cert) if info.valid && cert.days_remaining != 0 => {
                Ok((Some(cert.days_remaining), true))
            }
            _ => Ok((None, false)),
        },
        Err(e) => {
            tracing::debug!(monitor_id, error = %e, "unparseable monitor_tls_info");
            Ok((None, false))
        }
    }
}
