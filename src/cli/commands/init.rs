use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::schema::ensure_schema;

/// `census init` - create all tables and indexes. Every statement is
/// IF NOT EXISTS, so re-running against an existing database is safe.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    ensure_schema(&pool).await?;

    output_success(
        &output_format,
        "Database schema is up to date",
        Some(json!({ "database": "ready" })),
    )
}
