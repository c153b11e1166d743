//! Per-monitor Prometheus gauges.
//!
//! The four gauge families share one label set. It is fixed by the first
//! monitor that gets a metrics handle: the monitor columns plus that monitor's
//! tag names. Tags introduced later are not exported.

use crate::entity::monitor;
use crate::heartbeat::{Heartbeat, TlsInfo};
use dashmap::{DashMap, mapref::entry::Entry};
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Labels every series carries, in this order, before any tag labels.
pub const FIXED_LABELS: [&str; 5] = [
    "monitor_name",
    "monitor_type",
    "monitor_url",
    "monitor_hostname",
    "monitor_port",
];

static GLOBAL_REGISTRY: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Rewrite a tag name into a valid label name.
///
/// Returns `None` for names that cannot become a usable label: empty ones,
/// reserved `__` names and names clashing with [`FIXED_LABELS`].
pub fn sanitize_label_name(tag_name: &str) -> Option<String> {
    let mut label: String = tag_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if label.is_empty() {
        return None;
    }
    if label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert(0, '_');
    }
    if label.starts_with("__") || FIXED_LABELS.contains(&label.as_str()) {
        return None;
    }
    Some(label)
}

#[derive(Clone)]
struct MonitorGauges {
    label_names: Vec<String>,
    cert_days_remaining: GaugeVec,
    cert_is_valid: GaugeVec,
    response_time: GaugeVec,
    status: GaugeVec,
}

impl MonitorGauges {
    fn register(registry: &Registry, tag_labels: Vec<String>) -> Result<Self, prometheus::Error> {
        let mut label_names: Vec<String> = FIXED_LABELS.iter().map(ToString::to_string).collect();
        for tag in tag_labels {
            if !label_names.contains(&tag) {
                label_names.push(tag);
            }
        }
        let names: Vec<&str> = label_names.iter().map(String::as_str).collect();

        let gauge = |name: &str, help: &str| -> Result<GaugeVec, prometheus::Error> {
            let vec = GaugeVec::new(Opts::new(name, help), &names)?;
            registry.register(Box::new(vec.clone()))?;
            Ok(vec)
        };

        Ok(Self {
            cert_days_remaining: gauge(
                "monitor_cert_days_remaining",
                "The number of days remaining until the certificate expires",
            )?,
            cert_is_valid: gauge(
                "monitor_cert_is_valid",
                "Is the certificate still valid? (1 = Yes, 0= No)",
            )?,
            response_time: gauge(
                "monitor_response_time",
                "Monitor Response Time (ms)",
            )?,
            status: gauge(
                "monitor_status",
                "Monitor Status (1 = UP, 0= DOWN, 2= PENDING, 3= MAINTENANCE)",
            )?,
            label_names,
        })
    }

    fn families(&self) -> [(&'static str, &GaugeVec); 4] {
        [
            ("monitor_cert_days_remaining", &self.cert_days_remaining),
            ("monitor_cert_is_valid", &self.cert_is_valid),
            ("monitor_response_time", &self.response_time),
            ("monitor_status", &self.status),
        ]
    }
}

/// A Prometheus registry holding the monitor gauge families.
pub struct MetricsRegistry {
    registry: Registry,
    gauges: OnceCell<MonitorGauges>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// A fresh, isolated registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            gauges: OnceCell::new(),
        }
    }

    /// The process-wide registry served on `/metrics`.
    pub fn global() -> &'static MetricsRegistry {
        &GLOBAL_REGISTRY
    }

    /// Label names in effect, or `None` before the first monitor was registered.
    pub fn label_names(&self) -> Option<&[String]> {
        self.gauges.get().map(|g| g.label_names.as_slice())
    }

    fn gauges_for(&self, tag_labels: Vec<String>) -> Result<&MonitorGauges, prometheus::Error> {
        self.gauges.get_or_try_init(|| {
            let gauges = MonitorGauges::register(&self.registry, tag_labels)?;
            tracing::info!(
                name = "metrics.gauges.initialized",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                labels = ?gauges.label_names,
                message = "Monitor gauges registered"
            );
            Ok(gauges)
        })
    }

    /// Render every registered family in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Series handle for one monitor.
pub struct MonitorMetrics {
    gauges: MonitorGauges,
    label_values: Vec<String>,
}

impl MonitorMetrics {
    /// Build the label tuple of `monitor`. The first call on a registry also
    /// fixes the label set from `tags` (`(name, value)` pairs).
    pub fn new(
        registry: &MetricsRegistry,
        monitor: &monitor::Model,
        tags: &[(String, String)],
    ) -> Result<Self, prometheus::Error> {
        let mut tag_values: HashMap<String, String> = HashMap::new();
        for (name, value) in tags {
            if let Some(label) = sanitize_label_name(name) {
                tag_values.insert(label, value.clone());
            }
        }

        let mut first_labels: Vec<String> = Vec::new();
        for (name, _) in tags {
            if let Some(label) = sanitize_label_name(name)
                && !first_labels.contains(&label)
            {
                first_labels.push(label);
            }
        }

        let gauges = registry.gauges_for(first_labels)?.clone();

        let fixed = [
            monitor.name.clone(),
            monitor.monitor_type.clone(),
            monitor.url.clone().unwrap_or_default(),
            monitor.hostname.clone().unwrap_or_default(),
            monitor.port.map(|p| p.to_string()).unwrap_or_default(),
        ];
        let label_values = fixed
            .into_iter()
            .chain(
                gauges.label_names[FIXED_LABELS.len()..]
                    .iter()
                    .map(|label| tag_values.get(label).cloned().unwrap_or_default()),
            )
            .collect();

        Ok(Self {
            gauges,
            label_values,
        })
    }

    /// `(label, value)` pairs identifying this monitor's series.
    pub fn label_pairs(&self) -> Vec<(&str, &str)> {
        self.gauges
            .label_names
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
            .collect()
    }

    fn set(&self, family: &'static str, gauge: &GaugeVec, value: f64) {
        let values: Vec<&str> = self.label_values.iter().map(String::as_str).collect();
        match gauge.get_metric_with_label_values(&values) {
            Ok(g) => g.set(value),
            Err(e) => tracing::error!(
                name = "metrics.update.failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                family = family,
                error = %e,
                message = "Failed to update monitor gauge"
            ),
        }
    }

    /// Record the latest probe results. Each series is updated on its own and
    /// a failing one does not stop the others.
    pub fn update(&self, heartbeat: Option<&Heartbeat>, tls_info: Option<&TlsInfo>) {
        if let Some(tls) = tls_info {
            self.set(
                "monitor_cert_is_valid",
                &self.gauges.cert_is_valid,
                if tls.valid { 1.0 } else { 0.0 },
            );
            if let Some(cert) = &tls.cert_info {
                self.set(
                    "monitor_cert_days_remaining",
                    &self.gauges.cert_days_remaining,
                    cert.days_remaining as f64,
                );
            }
        }

        if let Some(beat) = heartbeat {
            self.set("monitor_status", &self.gauges.status, f64::from(beat.status));
            self.set(
                "monitor_response_time",
                &self.gauges.response_time,
                beat.ping.unwrap_or(-1.0),
            );
        }
    }

    /// Drop this monitor's series from every family. Series that were never
    /// written are skipped.
    pub fn remove(&self) {
        let values: Vec<&str> = self.label_values.iter().map(String::as_str).collect();
        for (family, gauge) in self.gauges.families() {
            if let Err(e) = gauge.remove_label_values(&values) {
                tracing::debug!(family, error = %e, "no series to remove");
            }
        }
    }
}

/// Live metrics handles keyed by monitor id.
#[derive(Default)]
pub struct MonitorMetricsSet {
    handles: DashMap<i32, MonitorMetrics>,
}

impl MonitorMetricsSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record probe results for `monitor`, creating its handle on first use.
    ///
    /// A handle whose label tuple no longer matches the monitor (renamed, new
    /// tag value, ...) is replaced and its old series removed.
    pub fn record(
        &self,
        registry: &MetricsRegistry,
        monitor: &monitor::Model,
        tags: &[(String, String)],
        heartbeat: Option<&Heartbeat>,
        tls_info: Option<&TlsInfo>,
    ) -> Result<(), prometheus::Error> {
        let fresh = MonitorMetrics::new(registry, monitor, tags)?;
        match self.handles.entry(monitor.id) {
            Entry::Occupied(mut slot) => {
                if slot.get().label_values != fresh.label_values {
                    slot.get().remove();
                    slot.insert(fresh);
                }
                slot.get().update(heartbeat, tls_info);
            }
            Entry::Vacant(slot) => slot.insert(fresh).update(heartbeat, tls_info),
        }
        Ok(())
    }

    /// Forget a monitor and drop its series. Returns whether it was known.
    pub fn remove(&self, monitor_id: i32) -> bool {
        match self.handles.remove(&monitor_id) {
            Some((_, handle)) => {
                handle.remove();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: i32, name: &str) -> monitor::Model {
        monitor::Model {
            id,
            name: name.into(),
            monitor_type: "http".into(),
            url: Some("https://example.org".into()),
            hostname: None,
            port: None,
            send_url: false,
            active: true,
            basic_auth_user: None,
            basic_auth_pass: None,
        }
    }

    #[test]
    fn sanitizes_tag_names() {
        assert_eq!(sanitize_label_name("env").as_deref(), Some("env"));
        assert_eq!(sanitize_label_name("team name").as_deref(), Some("team_name"));
        assert_eq!(sanitize_label_name("9lives").as_deref(), Some("_9lives"));
        assert_eq!(sanitize_label_name("monitor_name"), None);
        assert_eq!(sanitize_label_name("__meta"), None);
        assert_eq!(sanitize_label_name("  "), None);
    }

    #[test]
    fn label_set_frozen_by_first_monitor() {
        let registry = MetricsRegistry::new();
        assert!(registry.label_names().is_none());

        let first = MonitorMetrics::new(
            &registry,
            &monitor(1, "api"),
            &[("env".into(), "prod".into())],
        )
        .unwrap();
        let second = MonitorMetrics::new(
            &registry,
            &monitor(2, "web"),
            &[("team".into(), "ops".into())],
        )
        .unwrap();

        let labels = registry.label_names().unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[5], "env");
        assert!(first.label_pairs().contains(&("env", "prod")));
        assert!(second.label_pairs().contains(&("env", "")));
        assert!(!second.label_pairs().iter().any(|(k, _)| *k == "team"));
    }

    #[test]
    fn update_and_remove_series() {
        let registry = MetricsRegistry::new();
        let m = MonitorMetrics::new(&registry, &monitor(1, "api"), &[]).unwrap();
        m.update(
            Some(&Heartbeat {
                status: 1,
                ping: None,
                ..Default::default()
            }),
            None,
        );
        let text = registry.encode_text().unwrap();
        assert!(text.contains("monitor_status{"));
        assert!(text.contains("monitor_response_time{"));
        assert!(!text.contains("monitor_cert_is_valid{"));

        m.remove();
        m.remove();
        let text = registry.encode_text().unwrap();
        assert!(!text.contains("monitor_status{"));
    }
}
