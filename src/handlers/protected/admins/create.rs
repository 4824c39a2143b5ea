use axum::{response::Json, Extension};

use crate::database::models::Administrator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::policy::{effective_capabilities, ensure_can_assign, ensure_capability, Capability};
use crate::scope::resolve_scope;
use crate::services::{AdminService, GeoService, NewAdministrator};

/// POST /api/admins - create an administrator.
///
/// The creator needs the create-administrators capability, may only
/// assign levels at or below its own, and the new account's anchor must
/// land inside the creator's scope. The anchor consistency itself is
/// checked by resolving the prospective account's scope before the row
/// is written, so a misanchored account never reaches storage.
pub async fn admin_create(
    Extension(creator): Extension<Administrator>,
    Json(payload): Json<NewAdministrator>,
) -> ApiResult<Administrator> {
    let capabilities = effective_capabilities(creator.level, &creator.capability_overrides());
    ensure_capability(&capabilities, Capability::CreateAdministrators)?;
    ensure_can_assign(creator.level, payload.level)?;

    let tree = GeoService::new().await?.load_tree().await?;
    let creator_scope = resolve_scope(&creator, &tree)?;

    // Dry-run the new account through the scope resolver so bad anchors
    // are rejected up front with the same errors live accounts would get.
    let prospective = prospective_admin(&payload, &creator);
    let _ = resolve_scope(&prospective, &tree)?;
    creator_scope.authorize_admin(&tree, &prospective)?;

    let service = AdminService::new().await?;
    let admin = service.create(&payload, Some(creator.id)).await?;

    Ok(ApiResponse::created(admin))
}

/// A not-yet-persisted row carrying just the fields scope resolution
/// reads: level and anchor columns.
fn prospective_admin(new: &NewAdministrator, creator: &Administrator) -> Administrator {
    Administrator {
        id: uuid::Uuid::nil(),
        email: new.email.clone(),
        password_digest: String::new(),
        level: new.level,
        region_id: new.region_id,
        division_id: new.division_id,
        district_id: new.district_id,
        unit_id: new.unit_id,
        can_create_admins: None,
        can_manage_admins: None,
        can_set_deadlines: None,
        can_approve_submissions: None,
        can_view_system_logs: None,
        status: crate::database::models::AdminStatus::Active,
        created_by: Some(creator.id),
        updated_by: Some(creator.id),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}
