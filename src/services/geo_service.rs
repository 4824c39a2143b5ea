use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{DistrictRow, DivisionRow, RegionRow, UnitRow};
use crate::hierarchy::{GeoError, GeographicTree};

#[derive(Debug, Error)]
pub enum GeoServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error(transparent)]
    Hierarchy(#[from] GeoError),
}

/// Bulk import payload for the geographic hierarchy. Parents must appear
/// in the same payload or already exist in the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoImport {
    #[serde(default)]
    pub regions: Vec<RegionRow>,
    #[serde(default)]
    pub divisions: Vec<DivisionRow>,
    #[serde(default)]
    pub districts: Vec<DistrictRow>,
    #[serde(default)]
    pub units: Vec<UnitRow>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoImportReport {
    pub regions: u64,
    pub divisions: u64,
    pub districts: u64,
    pub units: u64,
}

pub struct GeoService {
    pool: PgPool,
}

impl GeoService {
    pub async fn new() -> Result<Self, GeoServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the full hierarchy into an in-memory tree snapshot.
    ///
    /// The tree is read-mostly; callers may hold it for the duration of a
    /// request but must not cache resolved scopes across requests.
    pub async fn load_tree(&self) -> Result<GeographicTree, GeoServiceError> {
        let regions: Vec<RegionRow> =
            sqlx::query_as("SELECT id, name FROM regions ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let divisions: Vec<DivisionRow> =
            sqlx::query_as("SELECT id, name, region_id FROM divisions ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let districts: Vec<DistrictRow> =
            sqlx::query_as("SELECT id, name, division_id FROM districts ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let units: Vec<UnitRow> =
            sqlx::query_as("SELECT id, name, district_id FROM units ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let mut tree = GeographicTree::new();
        for row in regions {
            tree.insert_region(row.id, row.name)?;
        }
        for row in divisions {
            tree.insert_division(row.id, row.name, row.region_id)?;
        }
        for row in districts {
            tree.insert_district(row.id, row.name, row.division_id)?;
        }
        for row in units {
            tree.insert_unit(row.id, row.name, row.district_id)?;
        }
        Ok(tree)
    }

    /// Upsert the hierarchy top-down so parents exist before children.
    /// Re-importing an existing node updates its display name only.
    pub async fn import(&self, payload: &GeoImport) -> Result<GeoImportReport, GeoServiceError> {
        let mut report = GeoImportReport { regions: 0, divisions: 0, districts: 0, units: 0 };

        for row in &payload.regions {
            report.regions += sqlx::query(
                "INSERT INTO regions (id, name) VALUES ($1, $2)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(row.id)
            .bind(&row.name)
            .execute(&self.pool)
            .await?
            .rows_affected();
        }
        for row in &payload.divisions {
            report.divisions += sqlx::query(
                "INSERT INTO divisions (id, name, region_id) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(row.region_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        }
        for row in &payload.districts {
            report.districts += sqlx::query(
                "INSERT INTO districts (id, name, division_id) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(row.division_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        }
        for row in &payload.units {
            report.units += sqlx::query(
                "INSERT INTO units (id, name, district_id) VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(row.id)
            .bind(&row.name)
            .bind(row.district_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        }

        info!(
            "Imported hierarchy: {} regions, {} divisions, {} districts, {} units",
            report.regions, report.divisions, report.districts, report.units
        );
        Ok(report)
    }
}
