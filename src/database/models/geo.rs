use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegionRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DivisionRow {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DistrictRow {
    pub id: i64,
    pub name: String,
    pub division_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnitRow {
    pub id: i64,
    pub name: String,
    pub district_id: i64,
}
