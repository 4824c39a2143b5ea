use axum::extract::Query;
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::database::models::Administrator;
use crate::error::ApiError;
use crate::hierarchy::{GeoError, GeographicTree, NodeRef};
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::{resolve_scope, Scope};
use crate::services::GeoService;

/// One hierarchy node as the browse endpoints render it.
#[derive(Debug, Serialize)]
pub struct GeoNode {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DivisionsQuery {
    pub region_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DistrictsQuery {
    pub division_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UnitsQuery {
    pub district_id: Option<i64>,
}

/// GET /api/geo/regions
pub async fn regions_get(Extension(admin): Extension<Administrator>) -> ApiResult<Vec<GeoNode>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;

    let mut nodes = Vec::new();
    for id in tree.region_ids() {
        push_if_browseable(&mut nodes, &scope, &tree, NodeRef::Region(id))?;
    }
    Ok(ApiResponse::success(nodes))
}

/// GET /api/geo/divisions?region_id=
pub async fn divisions_get(
    Extension(admin): Extension<Administrator>,
    Query(query): Query<DivisionsQuery>,
) -> ApiResult<Vec<GeoNode>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;

    let region_ids = match query.region_id {
        Some(region_id) => {
            authorize_filter(&scope, &tree, NodeRef::Region(region_id))?;
            vec![region_id]
        }
        None => tree.region_ids(),
    };

    let mut nodes = Vec::new();
    for region_id in region_ids {
        for id in tree.divisions_in(region_id)? {
            push_if_browseable(&mut nodes, &scope, &tree, NodeRef::Division(id))?;
        }
    }
    Ok(ApiResponse::success(nodes))
}

/// GET /api/geo/districts?division_id=
pub async fn districts_get(
    Extension(admin): Extension<Administrator>,
    Query(query): Query<DistrictsQuery>,
) -> ApiResult<Vec<GeoNode>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;

    let division_ids = match query.division_id {
        Some(division_id) => {
            authorize_filter(&scope, &tree, NodeRef::Division(division_id))?;
            vec![division_id]
        }
        None => {
            let mut ids = Vec::new();
            for region_id in tree.region_ids() {
                ids.extend(tree.divisions_in(region_id)?);
            }
            ids
        }
    };

    let mut nodes = Vec::new();
    for division_id in division_ids {
        for id in tree.districts_in(division_id)? {
            push_if_browseable(&mut nodes, &scope, &tree, NodeRef::District(id))?;
        }
    }
    Ok(ApiResponse::success(nodes))
}

/// GET /api/geo/units?district_id=
pub async fn units_get(
    Extension(admin): Extension<Administrator>,
    Query(query): Query<UnitsQuery>,
) -> ApiResult<Vec<GeoNode>> {
    let tree = GeoService::new().await?.load_tree().await?;
    let scope = resolve_scope(&admin, &tree)?;

    let mut nodes = Vec::new();
    match query.district_id {
        Some(district_id) => {
            authorize_filter(&scope, &tree, NodeRef::District(district_id))?;
            for id in tree.units_in_district(district_id)? {
                push_if_browseable(&mut nodes, &scope, &tree, NodeRef::Unit(id))?;
            }
        }
        None => {
            for id in scope.units(&tree)? {
                push_if_browseable(&mut nodes, &scope, &tree, NodeRef::Unit(id))?;
            }
        }
    }
    Ok(ApiResponse::success(nodes))
}

/// A node is browseable when its subtree intersects the caller's scope:
/// either it sits inside the scope, or it is an ancestor of the scope's
/// anchor (so the caller can navigate down its own path).
fn browseable(scope: &Scope, tree: &GeographicTree, node: NodeRef) -> Result<bool, GeoError> {
    match scope {
        Scope::Unrestricted => Ok(tree.contains(node)),
        Scope::Subtree { anchor } => Ok(tree.is_self_or_descendant(node, *anchor)?
            || tree.is_self_or_descendant(*anchor, node)?),
    }
}

/// An explicit parent filter outside the caller's reach fails loudly;
/// it must never quietly collapse to an empty listing.
fn authorize_filter(
    scope: &Scope,
    tree: &GeographicTree,
    node: NodeRef,
) -> Result<(), ApiError> {
    if !tree.contains(node) {
        return Err(ApiError::not_found(format!(
            "{} {} not found",
            node.level(),
            node.id()
        )));
    }
    if !browseable(scope, tree, node)? {
        return Err(ApiError::access_denied(format!(
            "{} {} is outside your scope",
            node.level(),
            node.id()
        )));
    }
    Ok(())
}

fn push_if_browseable(
    nodes: &mut Vec<GeoNode>,
    scope: &Scope,
    tree: &GeographicTree,
    node: NodeRef,
) -> Result<(), ApiError> {
    if browseable(scope, tree, node)? {
        let name = tree.name_of(node).unwrap_or_default().to_string();
        let parent_id = tree.parent(node)?.map(|p| p.id());
        nodes.push(GeoNode { id: node.id(), name, parent_id });
    }
    Ok(())
}
