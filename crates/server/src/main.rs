use color_eyre::eyre::WrapErr;
use sea_orm::Database;
use statuspage_server::AppResources;
use statuspage_server::api::start_webserver;
use statuspage_server::config::load_config_or_panic;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "statuspage_server=info,hyper=warn,sea_orm=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    initialize_tracing();

    let config = Arc::new(load_config_or_panic());

    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .wrap_err("Failed to connect to database")?,
    );

    let index_html = tokio::fs::read_to_string(&config.index_html_path)
        .await
        .wrap_err_with(|| format!("Failed to read SPA shell {}", config.index_html_path))?;

    let resources = AppResources::new(db, config.clone(), index_html)
        .wrap_err("Failed to build HTTP client")?;

    match resources.domains.refresh(resources.db.as_ref()).await {
        Ok(count) => tracing::info!(domains = count, "domain mapping loaded"),
        Err(e) => tracing::warn!(
            name = "startup.domain_refresh_failed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            error = %e,
            message = "Could not load custom domains; only slug routes will resolve"
        ),
    }

    tracing::info!(
        listen_addr = %config.listen_addr,
        default_slug = %config.default_slug,
        metrics = config.metrics.enabled,
        admin = config.admin_token.is_some(),
        "status page configuration"
    );

    start_webserver(resources).await?;
    Ok(())
}
