use axum::Extension;

use crate::database::models::Administrator;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::resolve_scope;
use crate::services::{AdminService, GeoService};

/// GET /api/admins - administrators whose anchor falls inside the
/// caller's scope. The list is filtered, not authorized per row; a
/// subtree admin simply does not see accounts outside its subtree.
pub async fn admins_list(
    Extension(caller): Extension<Administrator>,
) -> ApiResult<Vec<Administrator>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&caller, &tree)?;

    let all = AdminService::new().await?.list().await?;
    let mut visible = Vec::with_capacity(all.len());
    for admin in all {
        if scope.can_access_admin(&tree, &admin)? {
            visible.push(admin);
        }
    }
    Ok(ApiResponse::success(visible))
}
