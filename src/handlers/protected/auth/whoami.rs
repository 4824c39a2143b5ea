use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::Administrator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::effective_capabilities;

/// GET /api/auth/whoami - the authenticated administrator's identity,
/// level, anchor and effective capabilities.
pub async fn whoami_get(Extension(admin): Extension<Administrator>) -> ApiResult<Value> {
    let capabilities = effective_capabilities(admin.level, &admin.capability_overrides());

    Ok(ApiResponse::success(json!({
        "id": admin.id,
        "email": admin.email,
        "level": admin.level,
        "region_id": admin.region_id,
        "division_id": admin.division_id,
        "district_id": admin.district_id,
        "unit_id": admin.unit_id,
        "status": admin.status,
        "capabilities": capabilities,
    })))
}
