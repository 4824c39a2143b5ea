use axum::extract::Query;
use axum::Extension;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::completion::aggregate;
use crate::database::models::Administrator;
use crate::error::ApiError;
use crate::hierarchy::AdminLevel;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::resolve_scope;
use crate::services::{GeoService, ReportService};

#[derive(Debug, Deserialize)]
pub struct CompletionQuery {
    pub period: String,
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompletionReport {
    pub period: String,
    pub units: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Value>>,
}

/// GET /api/reports/completion?period=&level= - per-unit completion for
/// every unit in scope, optionally rolled up to a grouping level. Group
/// figures are sums over member units, so the roll-up reproduces exactly
/// from the per-unit rows.
pub async fn completion_get(
    Extension(admin): Extension<Administrator>,
    Query(query): Query<CompletionQuery>,
) -> ApiResult<CompletionReport> {
    if query.period.trim().is_empty() {
        return Err(ApiError::bad_request("Period is required"));
    }
    let period = query.period.trim();

    let group_level = match query.level.as_deref() {
        None => None,
        Some(s) => Some(parse_group_level(s)?),
    };

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;

    let service = ReportService::new().await?;
    let stats = service.unit_completion(&scope, &tree, period).await?;

    let units = stats
        .iter()
        .map(|s| {
            json!({
                "unit_id": s.unit_id,
                "answered": s.answered,
                "required": s.required,
                "completion": s.completion(),
                "completion_percent": s.completion_display(),
            })
        })
        .collect();

    let groups = match group_level {
        None => None,
        Some(level) => {
            let grouped = aggregate(&tree, &stats, level)?;
            Some(
                grouped
                    .iter()
                    .map(|g| {
                        json!({
                            "level": g.level,
                            "node_id": g.node_id,
                            "name": g.name,
                            "units": g.units,
                            "answered": g.answered,
                            "required": g.required,
                            "completion": g.completion(),
                            "completion_percent": g.completion_display(),
                        })
                    })
                    .collect(),
            )
        }
    };

    Ok(ApiResponse::success(CompletionReport {
        period: period.to_string(),
        units,
        groups,
    }))
}

/// Unit is not a grouping level; a per-unit report already is one.
fn parse_group_level(s: &str) -> Result<AdminLevel, ApiError> {
    match AdminLevel::parse(s) {
        Some(AdminLevel::Unit) | None => Err(ApiError::bad_request(format!(
            "'{}' is not a grouping level",
            s
        ))),
        Some(level) => Ok(level),
    }
}
