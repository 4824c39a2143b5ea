use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::services::{GeoImport, GeoService};

/// `census import <file>` - bulk-import the geographic hierarchy.
///
/// The file carries four arrays (regions, divisions, districts, units);
/// rows upsert by id, so re-importing a corrected file is the normal way
/// to fix names. Parents must appear in the same file or already exist.
pub async fn handle(file: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let payload: GeoImport = serde_json::from_str(&raw)?;

    let total = payload.regions.len()
        + payload.divisions.len()
        + payload.districts.len()
        + payload.units.len();
    let max = config::config().survey.max_import_batch;
    if total > max {
        output_error(
            &output_format,
            &format!("Import of {} nodes exceeds the batch limit of {}", total, max),
        )?;
        std::process::exit(1);
    }

    let service = GeoService::new().await?;
    let report = service.import(&payload).await?;

    output_success(
        &output_format,
        &format!(
            "Imported {} regions, {} divisions, {} districts, {} units",
            report.regions, report.divisions, report.districts, report.units
        ),
        Some(json!({
            "regions": report.regions,
            "divisions": report.divisions,
            "districts": report.districts,
            "units": report.units,
        })),
    )
}
