use axum::extract::Path;
use axum::{response::Json, Extension};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Administrator, ResponseRecord, Submission};
use crate::error::ApiError;
use crate::hierarchy::{AdminLevel, NodeRef};
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::resolve_scope;
use crate::services::{GeoService, SubmissionService};

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub unit_id: i64,
    pub period: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: i64,
    pub sub_question_id: Option<i64>,
    pub value: String,
}

/// POST /api/submissions - open a draft for (unit, period).
///
/// Only unit-level accounts hold drafts, and only for their own unit.
/// A live submission for the same period is a conflict; the caller
/// continues editing that one instead.
pub async fn submissions_post(
    Extension(admin): Extension<Administrator>,
    Json(payload): Json<DraftRequest>,
) -> ApiResult<Submission> {
    if admin.level != AdminLevel::Unit {
        return Err(ApiError::permission_denied(
            "Only unit-level accounts create submissions",
        ));
    }
    if payload.period.trim().is_empty() {
        return Err(ApiError::bad_request("Period is required"));
    }

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;
    scope.authorize_node(&tree, NodeRef::Unit(payload.unit_id))?;

    let service = SubmissionService::new().await?;
    if let Some(existing) = service
        .latest_for_unit(payload.unit_id, payload.period.trim())
        .await?
    {
        return Err(ApiError::conflict(format!(
            "Unit {} already has a live submission for period {} ({})",
            payload.unit_id, existing.period, existing.id
        )));
    }

    let submission = service
        .get_or_create_draft(payload.unit_id, payload.period.trim())
        .await?;

    info!(
        "Draft {} opened for unit {} period {}",
        submission.id, submission.unit_id, submission.period
    );
    Ok(ApiResponse::created(submission))
}

/// PUT /api/submissions/:id/answers - upsert one answer.
///
/// Editable only by the owning unit while the submission is in draft or
/// returned state; the service enforces the state, this handler the
/// identity.
pub async fn answers_put(
    Extension(admin): Extension<Administrator>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> ApiResult<ResponseRecord> {
    if admin.level != AdminLevel::Unit {
        return Err(ApiError::permission_denied(
            "Only unit-level accounts edit answers",
        ));
    }

    let service = SubmissionService::new().await?;
    let submission = service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Submission {} not found", id)))?;

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;
    scope.authorize_node(&tree, NodeRef::Unit(submission.unit_id))?;

    let record = service
        .upsert_answer(id, payload.question_id, payload.sub_question_id, &payload.value)
        .await?;
    Ok(ApiResponse::success(record))
}
