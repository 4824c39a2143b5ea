use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{verify_password, AdminService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: Value,
    pub expires_in: u64,
}

/// POST /auth/login - authenticate an administrator and return a JWT.
///
/// Invalid email and invalid password produce the same 401 so the
/// endpoint does not confirm which accounts exist.
pub async fn login_post(Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let service = AdminService::new().await?;
    let admin = service.get_by_email(payload.email.trim()).await?;

    let Some(admin) = admin else {
        warn!("Login attempt for unknown email {}", payload.email.trim());
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !admin.is_active() {
        warn!("Login attempt for deactivated account {}", admin.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !verify_password(&payload.password, &admin.password_digest) {
        warn!("Failed password for {}", admin.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = Claims::new(admin.id, admin.email.clone(), admin.level);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Could not issue token")
    })?;

    info!("Administrator {} logged in at level {}", admin.email, admin.level);

    Ok(ApiResponse::success(LoginResponse {
        token,
        admin: json!({
            "id": admin.id,
            "email": admin.email,
            "level": admin.level,
        }),
        expires_in: config::config().security.jwt_expiry_hours * 3600,
    }))
}
