//! Custom-domain to status-page-slug mapping.
//!
//! The mapping is rebuilt in full from the database and published as an
//! immutable snapshot. Readers grab the current `Arc` and never block a refresh
//! for longer than the pointer swap.

use crate::entity::{status_page, status_page_cname};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QuerySelect};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

pub type DomainSnapshot = Arc<HashMap<String, String>>;

#[derive(Debug, Default)]
pub struct DomainMappingCache {
    snapshot: RwLock<DomainSnapshot>,
    /// Held across read + swap so concurrent refreshes publish in the order they read.
    refresh_lock: Mutex<()>,
}

/// Lowercase and strip an optional `:port` so `Host` headers match stored domains.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        // bracketed IPv6 literal, keep everything up to the closing bracket
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(host)
    } else {
        host
    };
    without_port.to_ascii_lowercase()
}

impl DomainMappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache around an existing mapping.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let normalized = map
            .into_iter()
            .map(|(domain, slug)| (normalize_host(&domain), slug))
            .collect();
        Self {
            snapshot: RwLock::new(Arc::new(normalized)),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current snapshot. Holding it does not block refreshes.
    pub fn snapshot(&self) -> DomainSnapshot {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the whole mapping at once.
    pub fn replace(&self, map: HashMap<String, String>) {
        let next = Arc::new(map);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Reload every `domain -> slug` pair from storage in one query and swap the snapshot.
    ///
    /// On a database error the previous snapshot stays in place.
    #[tracing::instrument(skip(self, db))]
    pub async fn refresh<C: ConnectionTrait>(&self, db: &C) -> Result<usize, DbErr> {
        let _guard = self.refresh_lock.lock().await;
        let rows: Vec<(String, String)> = status_page_cname::Entity::find()
            .select_only()
            .column(status_page_cname::Column::Domain)
            .column(status_page::Column::Slug)
            .inner_join(status_page::Entity)
            .into_tuple()
            .all(db)
            .await?;

        let map: HashMap<String, String> = rows
            .into_iter()
            .map(|(domain, slug)| (normalize_host(&domain), slug))
            .collect();
        let count = map.len();
        self.replace(map);
        tracing::debug!(domains = count, "domain mapping refreshed");
        Ok(count)
    }

    /// Slug mapped to `hostname` in the last refreshed snapshot.
    pub fn resolve(&self, hostname: &str) -> Option<String> {
        self.snapshot().get(&normalize_host(hostname)).cloned()
    }

    /// All domains currently mapped to `slug`, sorted.
    pub fn domains_for_slug(&self, slug: &str) -> Vec<String> {
        let snapshot = self.snapshot();
        let mut domains: Vec<String> = snapshot
            .iter()
            .filter(|(_, s)| s.as_str() == slug)
            .map(|(d, _)| d.clone())
            .collect();
        domains.sort();
        domains
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
