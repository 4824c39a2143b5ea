use axum::extract::{Path, Query};
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Administrator, ResponseRecord, ReviewDecision, Submission};
use crate::error::ApiError;
use crate::hierarchy::NodeRef;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::resolve_scope;
use crate::services::{GeoService, SubmissionService};

/// A submission with its answers and full review trail.
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub answers: Vec<ResponseRecord>,
    pub decisions: Vec<ReviewDecision>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub period: Option<String>,
}

/// GET /api/submissions/:id - submission, answers and decision trail.
pub async fn submission_get(
    Extension(admin): Extension<Administrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<SubmissionDetail> {
    let service = SubmissionService::new().await?;
    let submission = service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Submission {} not found", id)))?;

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;
    scope.authorize_node(&tree, NodeRef::Unit(submission.unit_id))?;

    let answers = service.answers_for(id).await?;
    let decisions = service.decisions_for(id).await?;

    Ok(ApiResponse::success(SubmissionDetail { submission, answers, decisions }))
}

/// GET /api/submissions?period= - live submissions for every unit in the
/// caller's scope, the reviewer's work queue.
pub async fn submissions_list(
    Extension(admin): Extension<Administrator>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Submission>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;
    let units = scope.units(&tree)?;
    if units.is_empty() {
        return Ok(ApiResponse::success(Vec::new()));
    }

    let rows = SubmissionService::new()
        .await?
        .list_for_units(&units, query.period.as_deref())
        .await?;
    Ok(ApiResponse::success(rows))
}
