use axum::extract::Path;
use axum::{response::Json, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Administrator;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::{effective_capabilities, ensure_can_assign, ensure_capability, Capability};
use crate::scope::resolve_scope;
use crate::services::{AdminService, AdminUpdate, GeoService};

/// GET /api/admins/:id
pub async fn admin_get(
    Extension(caller): Extension<Administrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<Administrator> {
    let service = AdminService::new().await?;
    let admin = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Administrator {} not found", id)))?;

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&caller, &tree)?;
    scope.authorize_admin(&tree, &admin)?;

    Ok(ApiResponse::success(admin))
}

/// PUT /api/admins/:id - partial update of level, anchor, status and
/// capability flags. Requires manage-administrators plus scope over the
/// target both before and after the change, so an update cannot move an
/// account out from under the caller's own subtree.
pub async fn admin_update(
    Extension(caller): Extension<Administrator>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdate>,
) -> ApiResult<Administrator> {
    let capabilities = effective_capabilities(caller.level, &caller.capability_overrides());
    ensure_capability(&capabilities, Capability::ManageAdministrators)?;

    let service = AdminService::new().await?;
    let current = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Administrator {} not found", id)))?;

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&caller, &tree)?;
    scope.authorize_admin(&tree, &current)?;

    if let Some(level) = payload.level {
        ensure_can_assign(caller.level, level)?;
    }

    // Validate the row as it would look after the merge, before anything
    // is written: it must still resolve to a scope and still sit inside
    // the caller's subtree.
    let merged = merged_row(&current, &payload);
    let _ = resolve_scope(&merged, &tree)?;
    scope.authorize_admin(&tree, &merged)?;

    let updated = service.update(id, &payload, caller.id).await?;
    Ok(ApiResponse::success(updated))
}

/// The target row with the partial update applied, mirroring the merge
/// the service performs on write.
fn merged_row(current: &Administrator, update: &AdminUpdate) -> Administrator {
    let mut merged = current.clone();
    if let Some(level) = update.level {
        merged.level = level;
    }
    if let Some(region_id) = update.region_id {
        merged.region_id = region_id;
    }
    if let Some(division_id) = update.division_id {
        merged.division_id = division_id;
    }
    if let Some(district_id) = update.district_id {
        merged.district_id = district_id;
    }
    if let Some(unit_id) = update.unit_id {
        merged.unit_id = unit_id;
    }
    if let Some(status) = update.status {
        merged.status = status;
    }
    merged
}

/// DELETE /api/admins/:id - deactivate. Accounts are never hard-deleted;
/// the row stays for the review-decision audit trail.
pub async fn admin_delete(
    Extension(caller): Extension<Administrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let capabilities = effective_capabilities(caller.level, &caller.capability_overrides());
    ensure_capability(&capabilities, Capability::ManageAdministrators)?;

    if id == caller.id {
        return Err(ApiError::bad_request("Cannot deactivate your own account"));
    }

    let service = AdminService::new().await?;
    let target = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Administrator {} not found", id)))?;

    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&caller, &tree)?;
    scope.authorize_admin(&tree, &target)?;

    service.deactivate(id, caller.id).await?;
    Ok(ApiResponse::success(json!({ "deactivated": true })))
}
