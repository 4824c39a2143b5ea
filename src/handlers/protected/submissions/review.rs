use axum::extract::Path;
use axum::{response::Json, Extension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Administrator, ReviewDecision, Submission};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::GeoService;
use crate::workflow::WorkflowEngine;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub comment: Option<String>,
}

/// The submission after a review action, paired with the audit row the
/// action appended.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub submission: Submission,
    pub decision: ReviewDecision,
}

/// POST /api/submissions/:id/submit - hand the draft to the district.
pub async fn submit_post(
    Extension(admin): Extension<Administrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<Submission> {
    let tree = GeoService::new().await?.load_tree().await?;
    let engine = WorkflowEngine::new().await?;
    let submission = engine.submit(id, &admin, &tree).await?;
    Ok(ApiResponse::success(submission))
}

/// POST /api/submissions/:id/approve - approve at the caller's level.
pub async fn approve_post(
    Extension(admin): Extension<Administrator>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReviewRequest>>,
) -> ApiResult<ReviewResponse> {
    let comment = payload.as_ref().and_then(|p| p.comment.as_deref());
    let tree = GeoService::new().await?.load_tree().await?;
    let engine = WorkflowEngine::new().await?;
    let (submission, decision) = engine.approve(id, &admin, &tree, comment).await?;
    Ok(ApiResponse::success(ReviewResponse { submission, decision }))
}

/// POST /api/submissions/:id/return - send one level back down. The
/// comment is mandatory; the unit needs to know what to fix.
pub async fn return_post(
    Extension(admin): Extension<Administrator>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ReviewRequest>>,
) -> ApiResult<ReviewResponse> {
    let comment = payload.as_ref().and_then(|p| p.comment.as_deref());
    let tree = GeoService::new().await?.load_tree().await?;
    let engine = WorkflowEngine::new().await?;
    let (submission, decision) = engine.return_submission(id, &admin, &tree, comment).await?;
    Ok(ApiResponse::success(ReviewResponse { submission, decision }))
}
