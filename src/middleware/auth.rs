use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;
use crate::services::AdminService;

/// JWT authentication middleware.
///
/// The token only proves identity. After decoding, the administrator row
/// is fetched fresh from the database so that deactivations, level changes
/// and scope reassignments apply to the very next request rather than at
/// token expiry. The full `Administrator` row is injected into request
/// extensions for handlers to authorize against.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let token = extract_jwt_from_headers(&headers).map_err(unauthorized)?;

    let claims = validate_jwt(&token).map_err(unauthorized)?;

    let service = AdminService::new().await.map_err(reject)?;

    let admin = match service.get_by_id(claims.sub).await {
        Ok(Some(admin)) => admin,
        Ok(None) => return Err(unauthorized("Account no longer exists".to_string())),
        Err(e) => return Err(reject(e)),
    };

    if !admin.is_active() {
        return Err(unauthorized("Account is deactivated".to_string()));
    }

    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}

fn unauthorized(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    let api_error = ApiError::unauthorized(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
}

fn reject(err: impl Into<ApiError>) -> (StatusCode, Json<serde_json::Value>) {
    let api_error: ApiError = err.into();
    (
        StatusCode::from_u16(api_error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(api_error.to_json()),
    )
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
