use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::manager::DatabaseManager;
use crate::database::postgres::PgStore;
use crate::models::RECORD_CLASSES;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = PgStore::connect().await.context("Failed to connect to the database")?;
    store.ensure_schema().await.context("Failed to create database tables")?;

    let tables: Vec<&str> = RECORD_CLASSES.iter().map(|class| class.table).collect();
    let database = config().database.url.as_deref().map(DatabaseManager::redact);

    output_success(
        &output_format,
        &format!("Database schema is up to date ({})", tables.join(", ")),
        Some(json!({ "tables": tables, "database": database })),
    )
}
