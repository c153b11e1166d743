//! Custom domain assignment for status pages.

use crate::entity::status_page_cname;
use crate::error::StatusPageError;
use crate::validation::domain_name::validate_domain_name;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::Value;

/// Replace the domain list of a status page.
///
/// Runs in one transaction: every row of the page is dropped, then each entry
/// is claimed, taking it away from any other page that had it. Any invalid
/// entry rolls the whole change back. Returns the stored domains in input
/// order. Callers refresh the domain cache afterwards.
#[tracing::instrument(skip(db, domain_name_list))]
pub async fn update_domain_name_list(
    db: &DatabaseConnection,
    status_page_id: i32,
    domain_name_list: &Value,
) -> Result<Vec<String>, StatusPageError> {
    let Some(entries) = domain_name_list.as_array() else {
        return Err(StatusPageError::InvalidInput("Invalid array".into()));
    };

    let txn = db.begin().await?;
    match replace_domains(&txn, status_page_id, entries).await {
        Ok(stored) => {
            txn.commit().await?;
            tracing::info!(
                name = "status_page.domains.updated",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                status_page_id = status_page_id,
                count = stored.len(),
                message = "Status page domain list replaced"
            );
            Ok(stored)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::error!(
                    name = "status_page.domains.rollback_failed",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %rollback,
                    status_page_id = status_page_id,
                    message = "Rolling back domain list update failed"
                );
            }
            Err(e)
        }
    }
}

async fn replace_domains(
    txn: &DatabaseTransaction,
    status_page_id: i32,
    entries: &[Value],
) -> Result<Vec<String>, StatusPageError> {
    status_page_cname::Entity::delete_many()
        .filter(status_page_cname::Column::StatusPageId.eq(status_page_id))
        .exec(txn)
        .await?;

    let mut stored: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(raw) = entry.as_str() else {
            return Err(StatusPageError::InvalidInput("Invalid domain".into()));
        };
        let domain = raw.trim().to_ascii_lowercase();
        if domain.is_empty() || stored.contains(&domain) {
            continue;
        }
        validate_domain_name(&domain)
            .map_err(|e| StatusPageError::InvalidInput(e.to_string()))?;

        // A domain belongs to at most one page; the newest claim wins.
        status_page_cname::Entity::delete_many()
            .filter(status_page_cname::Column::Domain.eq(domain.as_str()))
            .exec(txn)
            .await?;

        status_page_cname::ActiveModel {
            status_page_id: Set(status_page_id),
            domain: Set(domain.clone()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        stored.push(domain);
    }
    Ok(stored)
}
