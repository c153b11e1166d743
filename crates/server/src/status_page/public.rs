//! JSON projections handed to browsers.
//!
//! Each type is built field-by-field from its entity, so columns that are not
//! listed here (monitor credentials, raw notification keys, ...) can never leak
//! into a public payload.

use crate::entity::{incident, maintenance, status_page};
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Icon shown when a status page has none configured.
pub const DEFAULT_ICON: &str = "/icon.png";

pub fn effective_icon(page: &status_page::Model) -> String {
    match page.icon.as_deref() {
        Some(icon) if !icon.is_empty() => icon.to_string(),
        _ => DEFAULT_ICON.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicStatusPageConfig {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: String,
    pub auto_refresh_interval: i32,
    pub theme: String,
    pub published: bool,
    pub show_tags: bool,
    #[serde(rename = "customCSS")]
    pub custom_css: Option<String>,
    pub footer_text: Option<String>,
    pub show_powered_by: bool,
    pub google_analytics_id: Option<String>,
    pub show_certificate_expiry: bool,
}

impl From<&status_page::Model> for PublicStatusPageConfig {
    fn from(page: &status_page::Model) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            icon: effective_icon(page),
            auto_refresh_interval: page.auto_refresh_interval,
            theme: page.theme.clone(),
            published: page.published,
            show_tags: page.show_tags,
            custom_css: page.custom_css.clone(),
            footer_text: page.footer_text.clone(),
            show_powered_by: page.show_powered_by,
            google_analytics_id: page.google_analytics_tag_id.clone(),
            show_certificate_expiry: page.show_certificate_expiry,
        }
    }
}

/// Status page as listed to administrators.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusPage {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: String,
    pub theme: String,
    pub auto_refresh_interval: i32,
    pub published: bool,
    pub show_tags: bool,
    pub domain_name_list: Vec<String>,
    #[serde(rename = "customCSS")]
    pub custom_css: Option<String>,
    pub footer_text: Option<String>,
    pub show_powered_by: bool,
    pub google_analytics_id: Option<String>,
    pub show_certificate_expiry: bool,
}

impl AdminStatusPage {
    pub fn new(page: &status_page::Model, domain_name_list: Vec<String>) -> Self {
        Self {
            id: page.id,
            slug: page.slug.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            icon: effective_icon(page),
            theme: page.theme.clone(),
            auto_refresh_interval: page.auto_refresh_interval,
            published: page.published,
            show_tags: page.show_tags,
            domain_name_list,
            custom_css: page.custom_css.clone(),
            footer_text: page.footer_text.clone(),
            show_powered_by: page.show_powered_by,
            google_analytics_id: page.google_analytics_tag_id.clone(),
            show_certificate_expiry: page.show_certificate_expiry,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicIncident {
    pub id: i32,
    pub style: String,
    pub title: String,
    pub content: String,
    pub pin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_updated_date: Option<OffsetDateTime>,
}

impl From<incident::Model> for PublicIncident {
    fn from(m: incident::Model) -> Self {
        Self {
            id: m.id,
            style: m.style,
            title: m.title,
            content: m.content,
            pin: m.pin,
            created_date: m.created_date,
            last_updated_date: m.last_updated_date,
        }
    }
}

pub const UNDER_MAINTENANCE: &str = "under-maintenance";

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicMaintenance {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub strategy: String,
    pub active: bool,
    pub status: String,
}

impl PublicMaintenance {
    /// Projection of a window that is currently under maintenance.
    pub fn under_maintenance(m: &maintenance::Model) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            description: m.description.clone(),
            strategy: m.strategy.clone(),
            active: m.active,
            status: UNDER_MAINTENANCE.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicTag {
    pub tag_id: i32,
    pub name: String,
    pub color: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicMonitor {
    pub id: i32,
    pub name: String,
    pub send_url: bool,
    #[serde(rename = "type")]
    pub monitor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<PublicTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_expiry_days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_cert: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicGroup {
    pub id: i32,
    pub name: String,
    pub weight: i32,
    pub monitor_list: Vec<PublicMonitor>,
}

/// Everything a status page needs to hydrate without a second round trip.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageData {
    pub config: PublicStatusPageConfig,
    pub incident: Option<PublicIncident>,
    pub public_group_list: Vec<PublicGroup>,
    pub maintenance_list: Vec<PublicMaintenance>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Web app manifest served per status page.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Manifest {
    pub name: String,
    pub start_url: String,
    pub display: String,
    pub icons: Vec<ManifestIcon>,
}

impl From<&status_page::Model> for Manifest {
    fn from(page: &status_page::Model) -> Self {
        Self {
            name: page.title.clone(),
            start_url: format!("/status/{}", page.slug),
            display: "standalone".to_string(),
            icons: vec![ManifestIcon {
                src: effective_icon(page),
                sizes: "128x128".to_string(),
                mime_type: "image/png".to_string(),
            }],
        }
    }
}
