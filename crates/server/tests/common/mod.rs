//! Shared fixtures for integration tests: in-memory schema, seed rows, config.

#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use statuspage_server::AppResources;
use statuspage_server::config::{AppConfig, MetricsConfig, NotificationConfig};
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "test-admin-token-0123456789";

pub const SHELL: &str = r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>Uptime</title><meta name="description" content="A status page"><link rel="icon" type="image/svg+xml" href="/icon.svg"><link rel="apple-touch-icon" sizes="180x180" href="/apple-touch-icon.png"><link rel="manifest" href="/manifest.json"></head><body><div id="app"></div></body></html>"#;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE status_page (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT NULL,
        icon TEXT NULL,
        theme TEXT NOT NULL DEFAULT 'auto',
        auto_refresh_interval INTEGER NOT NULL DEFAULT 300,
        custom_css TEXT NULL,
        footer_text TEXT NULL,
        published BOOLEAN NOT NULL DEFAULT 1,
        show_tags BOOLEAN NOT NULL DEFAULT 0,
        show_powered_by BOOLEAN NOT NULL DEFAULT 1,
        show_certificate_expiry BOOLEAN NOT NULL DEFAULT 0,
        google_analytics_tag_id TEXT NULL
    );"#,
    r#"CREATE TABLE status_page_cname (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        status_page_id INTEGER NOT NULL,
        domain TEXT NOT NULL UNIQUE
    );"#,
    r#"CREATE TABLE incident (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        status_page_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        style TEXT NOT NULL DEFAULT 'primary',
        pin BOOLEAN NOT NULL DEFAULT 1,
        active BOOLEAN NOT NULL DEFAULT 1,
        created_date TEXT NOT NULL,
        last_updated_date TEXT NULL
    );"#,
    r#"CREATE TABLE maintenance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        strategy TEXT NOT NULL DEFAULT 'single',
        active BOOLEAN NOT NULL DEFAULT 1,
        start_date TEXT NULL,
        end_date TEXT NULL
    );"#,
    r#"CREATE TABLE maintenance_status_page (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        maintenance_id INTEGER NOT NULL,
        status_page_id INTEGER NOT NULL
    );"#,
    r#"CREATE TABLE "group" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        public BOOLEAN NOT NULL DEFAULT 0,
        status_page_id INTEGER NULL,
        weight INTEGER NOT NULL DEFAULT 1000
    );"#,
    r#"CREATE TABLE monitor (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        url TEXT NULL,
        hostname TEXT NULL,
        port INTEGER NULL,
        send_url BOOLEAN NOT NULL DEFAULT 0,
        active BOOLEAN NOT NULL DEFAULT 1,
        basic_auth_user TEXT NULL,
        basic_auth_pass TEXT NULL
    );"#,
    r#"CREATE TABLE monitor_group (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        monitor_id INTEGER NOT NULL,
        group_id INTEGER NOT NULL,
        weight INTEGER NOT NULL DEFAULT 1000
    );"#,
    r#"CREATE TABLE tag (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        color TEXT NOT NULL
    );"#,
    r#"CREATE TABLE monitor_tag (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        monitor_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        value TEXT NOT NULL DEFAULT ''
    );"#,
    r#"CREATE TABLE monitor_tls_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        monitor_id INTEGER NOT NULL UNIQUE,
        info_json TEXT NOT NULL
    );"#,
];

/// In-memory database with every table the server reads.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");
    for ddl in SCHEMA {
        db.execute(Statement::from_string(DbBackend::Sqlite, *ddl))
            .await
            .expect("create table");
    }
    db
}

pub async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(DbBackend::Sqlite, sql))
        .await
        .unwrap_or_else(|e| panic!("{sql}: {e}"));
}

/// Insert a plain status page and return its id.
pub async fn insert_status_page(db: &DatabaseConnection, id: i32, slug: &str, title: &str) -> i32 {
    exec(
        db,
        &format!(
            "INSERT INTO status_page (id, slug, title, description) VALUES ({id}, '{slug}', '{title}', 'Status of {title}')"
        ),
    )
    .await;
    id
}

pub async fn insert_cname(db: &DatabaseConnection, status_page_id: i32, domain: &str) {
    exec(
        db,
        &format!(
            "INSERT INTO status_page_cname (status_page_id, domain) VALUES ({status_page_id}, '{domain}')"
        ),
    )
    .await;
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        listen_addr: "127.0.0.1:0".parse().expect("addr"),
        index_html_path: "dist/index.html".into(),
        default_slug: "default".into(),
        admin_token: Some(ADMIN_TOKEN.into()),
        metrics: MetricsConfig::default(),
        notification: NotificationConfig::default(),
    }
}

pub async fn create_test_resources() -> AppResources {
    let db = Arc::new(create_test_db().await);
    AppResources::new(db, Arc::new(test_config()), SHELL).expect("resources")
}
