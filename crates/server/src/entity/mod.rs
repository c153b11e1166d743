//! Database entities for status pages, monitors and their associations.

pub mod group;
pub mod incident;
pub mod maintenance;
pub mod maintenance_status_page;
pub mod monitor;
pub mod monitor_group;
pub mod monitor_tag;
pub mod monitor_tls_info;
pub mod status_page;
pub mod status_page_cname;
pub mod tag;
