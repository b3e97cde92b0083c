use anyhow::Context;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let outcome = DatabaseManager::migrate(&pool).await;
    DatabaseManager::close(&pool).await;
    outcome.context("migration failed")?;

    utils::output_success(output_format, "Schema is up to date", None)
}
