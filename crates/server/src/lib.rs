//! Public status pages for an uptime monitor.
//!
//! Serves server-rendered status pages (by slug or by custom domain), sends
//! webhook notifications and exports per-monitor Prometheus gauges.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::cache::DomainMappingCache;
use crate::config::AppConfig;
use crate::stats::{MetricsRegistry, MonitorMetricsSet};
use crate::status_page::{DbMaintenanceSchedule, MaintenanceSchedule};

pub mod analytics;
pub mod api;
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod heartbeat;
pub mod html;
pub mod notification;
pub mod stats;
pub mod status_page;
pub mod utils;
pub mod validation;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub domains: Arc<DomainMappingCache>,
    pub maintenance: Arc<dyn MaintenanceSchedule>,
    pub metrics: &'static MetricsRegistry,
    pub monitor_metrics: Arc<MonitorMetricsSet>,
    pub http: reqwest::Client,
    /// The SPA shell every status page is rendered into.
    pub index_html: Arc<str>,
}

impl AppResources {
    /// Wire up the default collaborators around a database connection.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<AppConfig>,
        index_html: impl Into<Arc<str>>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notification.timeout_secs))
            .build()?;
        Ok(Self {
            maintenance: Arc::new(DbMaintenanceSchedule::new(db.clone())),
            db,
            config,
            domains: Arc::new(DomainMappingCache::new()),
            metrics: MetricsRegistry::global(),
            monitor_metrics: Arc::new(MonitorMetricsSet::new()),
            http,
            index_html: index_html.into(),
        })
    }
}
