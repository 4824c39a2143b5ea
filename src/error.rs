// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Scope, permission, transition, not-found and conflict failures each
/// carry a distinct stable code, so clients can tell "you may not see
/// this" from "this does not exist" from "not valid right now".
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    AccessDenied(String),
    PermissionDenied(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),
    InvalidTransition(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::AccessDenied(_) => 403,
            ApiError::PermissionDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InvalidTransition(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::AccessDenied(msg) => msg,
            ApiError::PermissionDenied(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InvalidTransition(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::AccessDenied(_) => "ACCESS_DENIED",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidTransition(_) => "INVALID_TRANSITION",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError { message: message.into(), field_errors }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        ApiError::AccessDenied(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        ApiError::InvalidTransition(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            crate::database::manager::DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Service is not fully configured")
            }
            crate::database::manager::DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Invalid DATABASE_URL");
                ApiError::service_unavailable("Service is not fully configured")
            }
            crate::database::manager::DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            crate::database::manager::DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLx error: {}", err);
        ApiError::internal_server_error("Database error occurred")
    }
}

impl From<crate::hierarchy::GeoError> for ApiError {
    fn from(err: crate::hierarchy::GeoError) -> Self {
        match err {
            crate::hierarchy::GeoError::DuplicateNode { .. } => {
                ApiError::conflict(err.to_string())
            }
            _ => ApiError::not_found(err.to_string()),
        }
    }
}

impl From<crate::scope::ScopeError> for ApiError {
    fn from(err: crate::scope::ScopeError) -> Self {
        match err {
            crate::scope::ScopeError::AccessDenied(_)
            | crate::scope::ScopeError::AdminAccessDenied(_) => {
                ApiError::access_denied(err.to_string())
            }
            crate::scope::ScopeError::Geo(geo) => geo.into(),
            // An account whose anchor columns disagree with the hierarchy
            // resolves to a denial, never to a wider scope.
            crate::scope::ScopeError::MissingAnchor { .. }
            | crate::scope::ScopeError::InconsistentAnchor { .. } => {
                tracing::error!("Scope resolution failed: {}", err);
                ApiError::access_denied("Account scope could not be resolved")
            }
        }
    }
}

impl From<crate::policy::PolicyError> for ApiError {
    fn from(err: crate::policy::PolicyError) -> Self {
        ApiError::permission_denied(err.to_string())
    }
}

impl From<crate::workflow::WorkflowError> for ApiError {
    fn from(err: crate::workflow::WorkflowError) -> Self {
        match err {
            // Recoverable: the caller re-fetches and retries
            crate::workflow::WorkflowError::StaleState => ApiError::conflict(err.to_string()),
            _ => ApiError::invalid_transition(err.to_string()),
        }
    }
}

impl From<crate::workflow::engine::EngineError> for ApiError {
    fn from(err: crate::workflow::engine::EngineError) -> Self {
        match err {
            crate::workflow::engine::EngineError::Database(e) => e.into(),
            crate::workflow::engine::EngineError::DatabaseManager(e) => e.into(),
            crate::workflow::engine::EngineError::Scope(e) => e.into(),
            crate::workflow::engine::EngineError::Policy(e) => e.into(),
            crate::workflow::engine::EngineError::Workflow(e) => e.into(),
            crate::workflow::engine::EngineError::SubmissionNotFound(id) => {
                ApiError::not_found(format!("Submission not found: {id}"))
            }
            crate::workflow::engine::EngineError::SubmitterNotUnit(_) => {
                ApiError::permission_denied(err.to_string())
            }
            crate::workflow::engine::EngineError::CommentTooLong { .. } => {
                ApiError::bad_request(err.to_string())
            }
        }
    }
}

impl From<crate::services::AdminError> for ApiError {
    fn from(err: crate::services::AdminError) -> Self {
        match err {
            crate::services::AdminError::Database(e) => e.into(),
            crate::services::AdminError::DatabaseManager(e) => e.into(),
            crate::services::AdminError::AlreadyExists(email) => {
                ApiError::conflict(format!("Administrator already exists: {email}"))
            }
            crate::services::AdminError::NotFound(id) => {
                ApiError::not_found(format!("Administrator not found: {id}"))
            }
            crate::services::AdminError::InvalidEmail(email) => {
                ApiError::bad_request(format!("Invalid email: {email}"))
            }
            crate::services::AdminError::PasswordHash => {
                tracing::error!("Password hashing failed");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::services::GeoServiceError> for ApiError {
    fn from(err: crate::services::GeoServiceError) -> Self {
        match err {
            crate::services::GeoServiceError::Database(e) => e.into(),
            crate::services::GeoServiceError::DatabaseManager(e) => e.into(),
            crate::services::GeoServiceError::Hierarchy(e) => e.into(),
        }
    }
}

impl From<crate::services::SubmissionError> for ApiError {
    fn from(err: crate::services::SubmissionError) -> Self {
        match err {
            crate::services::SubmissionError::Database(e) => e.into(),
            crate::services::SubmissionError::DatabaseManager(e) => e.into(),
            crate::services::SubmissionError::NotFound(id) => {
                ApiError::not_found(format!("Submission not found: {id}"))
            }
            crate::services::SubmissionError::NotEditable(status) => {
                ApiError::invalid_transition(format!(
                    "Submission is not editable in state '{status}'"
                ))
            }
            crate::services::SubmissionError::EmptyValue => {
                ApiError::bad_request("Answer value must not be empty")
            }
        }
    }
}

impl From<crate::services::QuestionError> for ApiError {
    fn from(err: crate::services::QuestionError) -> Self {
        match err {
            crate::services::QuestionError::Database(e) => e.into(),
            crate::services::QuestionError::DatabaseManager(e) => e.into(),
        }
    }
}

impl From<crate::services::ReportError> for ApiError {
    fn from(err: crate::services::ReportError) -> Self {
        match err {
            crate::services::ReportError::DatabaseManager(e) => e.into(),
            crate::services::ReportError::Hierarchy(e) => e.into(),
            crate::services::ReportError::Submission(e) => e.into(),
            crate::services::ReportError::Question(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_distinct_and_stable() {
        let errors = [
            ApiError::access_denied("x"),
            ApiError::permission_denied("x"),
            ApiError::invalid_transition("x"),
            ApiError::not_found("x"),
            ApiError::conflict("x"),
        ];
        let codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        assert_eq!(
            codes,
            ["ACCESS_DENIED", "PERMISSION_DENIED", "INVALID_TRANSITION", "NOT_FOUND", "CONFLICT"]
        );
    }

    #[test]
    fn scope_denial_maps_to_forbidden() {
        use crate::hierarchy::NodeRef;
        let err: ApiError = crate::scope::ScopeError::AccessDenied(NodeRef::Unit(7)).into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "ACCESS_DENIED");
    }

    #[test]
    fn stale_workflow_race_maps_to_conflict() {
        let err: ApiError = crate::workflow::WorkflowError::StaleState.into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn wrong_reviewer_level_maps_to_invalid_transition() {
        use crate::hierarchy::AdminLevel;
        let err: ApiError = crate::workflow::WorkflowError::WrongReviewerLevel {
            expected: AdminLevel::Division,
            actual: AdminLevel::District,
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
