//! Maintenance window lookup.
//!
//! Deciding whether a window is active right now belongs to the maintenance
//! scheduler. Status pages only consume that decision through
//! [`MaintenanceSchedule`].

use crate::entity::maintenance;
use crate::error::StatusPageError;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;
use time::OffsetDateTime;

#[async_trait]
pub trait MaintenanceSchedule: Send + Sync {
    async fn get_maintenance(
        &self,
        maintenance_id: i32,
    ) -> Result<Option<maintenance::Model>, StatusPageError>;

    async fn is_under_maintenance(
        &self,
        maintenance: &maintenance::Model,
    ) -> Result<bool, StatusPageError>;
}

/// Manual windows are active while switched on. Single windows are active
/// inside `[start_date, end_date)`. Recurring strategies are left to the scheduler
/// and never count as active here.
pub fn window_is_active(m: &maintenance::Model, now: OffsetDateTime) -> bool {
    if !m.active {
        return false;
    }
    match m.strategy.as_str() {
        "manual" => true,
        "single" => match (m.start_date, m.end_date) {
            (Some(start), Some(end)) => start <= now && now < end,
            (Some(start), None) => start <= now,
            _ => false,
        },
        _ => false,
    }
}

/// Reads windows straight from the `maintenance` table.
pub struct DbMaintenanceSchedule {
    db: Arc<DatabaseConnection>,
}

impl DbMaintenanceSchedule {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaintenanceSchedule for DbMaintenanceSchedule {
    async fn get_maintenance(
        &self,
        maintenance_id: i32,
    ) -> Result<Option<maintenance::Model>, StatusPageError> {
        Ok(maintenance::Entity::find_by_id(maintenance_id)
            .one(self.db.as_ref())
            .await?)
    }

    async fn is_under_maintenance(
        &self,
        maintenance: &maintenance::Model,
    ) -> Result<bool, StatusPageError> {
        Ok(window_is_active(maintenance, OffsetDateTime::now_utc()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn window(strategy: &str, active: bool) -> maintenance::Model {
        maintenance::Model {
            id: 1,
            title: "DB upgrade".into(),
            description: String::new(),
            strategy: strategy.into(),
            active,
            start_date: Some(datetime!(2026-01-01 00:00 UTC)),
            end_date: Some(datetime!(2026-01-02 00:00 UTC)),
        }
    }

    #[test]
    fn manual_follows_active_flag() {
        let now = datetime!(2030-01-01 00:00 UTC);
        assert!(window_is_active(&window("manual", true), now));
        assert!(!window_is_active(&window("manual", false), now));
    }

    #[test]
    fn single_uses_half_open_range() {
        let m = window("single", true);
        assert!(window_is_active(&m, datetime!(2026-01-01 00:00 UTC)));
        assert!(window_is_active(&m, datetime!(2026-01-01 12:00 UTC)));
        assert!(!window_is_active(&m, datetime!(2026-01-02 00:00 UTC)));
        assert!(!window_is_active(&m, datetime!(2025-12-31 23:59 UTC)));
    }

    #[test]
    fn recurring_is_not_decided_here() {
        let m = window("recurring-interval", true);
        assert!(!window_is_active(&m, datetime!(2026-01-01 12:00 UTC)));
    }
}
