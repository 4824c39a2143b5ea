use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::Administrator;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AdminService;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub password: String,
}

/// PUT /api/auth/password - self-service credential change.
pub async fn password_put(
    Extension(admin): Extension<Administrator>,
    Json(payload): Json<PasswordChangeRequest>,
) -> ApiResult<Value> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let service = AdminService::new().await?;
    service.change_password(admin.id, &payload.password).await?;

    info!("Administrator {} changed password", admin.email);
    Ok(ApiResponse::success(json!({ "updated": true })))
}
