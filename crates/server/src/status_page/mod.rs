//! Status pages: lookup, data assembly, domain assignment and shell rendering.

pub mod data;
pub mod domains;
pub mod maintenance;
pub mod public;
pub mod render;

pub use data::get_status_page_data;
pub use domains::update_domain_name_list;
pub use maintenance::{DbMaintenanceSchedule, MaintenanceSchedule};
pub use public::{AdminStatusPage, Manifest, StatusPageData};
pub use render::render_html;

use crate::cache::DomainMappingCache;
use crate::entity::status_page;
use crate::error::StatusPageError;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::collections::BTreeMap;

/// Map the trailing-slash sentinel `index.html` and the empty slug to `default_slug`.
pub fn normalize_slug<'a>(slug: &'a str, default_slug: &'a str) -> &'a str {
    match slug {
        "" | "index.html" => default_slug,
        other => other,
    }
}

pub async fn find_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<status_page::Model>, StatusPageError> {
    Ok(status_page::Entity::find()
        .filter(status_page::Column::Slug.eq(slug))
        .one(db)
        .await?)
}

pub async fn slug_to_id(db: &DatabaseConnection, slug: &str) -> Result<Option<i32>, StatusPageError> {
    Ok(status_page::Entity::find()
        .select_only()
        .column(status_page::Column::Id)
        .filter(status_page::Column::Slug.eq(slug))
        .into_tuple()
        .one(db)
        .await?)
}

/// Every status page in administrator form, keyed by id. Pages are read in
/// title order.
pub async fn list_status_pages(
    db: &DatabaseConnection,
    domains: &DomainMappingCache,
) -> Result<BTreeMap<i32, AdminStatusPage>, StatusPageError> {
    let pages = status_page::Entity::find()
        .order_by_asc(status_page::Column::Title)
        .all(db)
        .await?;

    Ok(pages
        .iter()
        .map(|page| {
            (
                page.id,
                AdminStatusPage::new(page, domains.domains_for_slug(&page.slug)),
            )
        })
        .collect())
}

/// Assemble the data of `page` and inject it into the shell.
pub async fn render_status_page(
    db: &DatabaseConnection,
    schedule: &dyn MaintenanceSchedule,
    index_html: &str,
    page: &status_page::Model,
) -> Result<String, StatusPageError> {
    let data = get_status_page_data(db, schedule, page).await?;
    render_html(index_html, page, &data)
}

#[cfg(test)]
mod tests {
    use super::normalize_slug;

    #[test]
    fn sentinel_slugs_fall_back_to_default() {
        assert_eq!(normalize_slug("", "default"), "default");
        assert_eq!(normalize_slug("index.html", "default"), "default");
        assert_eq!(normalize_slug("ops", "default"), "ops");
    }
}
