#![allow(dead_code)]

use chrono::Utc;
use uuid::Uuid;

use census_api_rust::database::models::{AdminStatus, Administrator};
use census_api_rust::hierarchy::{AdminLevel, GeographicTree};

/// Two regions with an uneven shape, small enough to reason about by
/// hand:
///
/// region 1
///   division 11
///     district 111: units 1111, 1112
///     district 112: unit  1121
///   division 12
///     district 121: unit  1211
/// region 2
///   division 21
///     district 211: unit  2111
pub fn sample_tree() -> GeographicTree {
    let mut tree = GeographicTree::new();
    tree.insert_region(1, "North").unwrap();
    tree.insert_region(2, "South").unwrap();

    tree.insert_division(11, "North-East", 1).unwrap();
    tree.insert_division(12, "North-West", 1).unwrap();
    tree.insert_division(21, "South-Central", 2).unwrap();

    tree.insert_district(111, "Lakeside", 11).unwrap();
    tree.insert_district(112, "Hillcrest", 11).unwrap();
    tree.insert_district(121, "Riverton", 12).unwrap();
    tree.insert_district(211, "Meadowbrook", 21).unwrap();

    tree.insert_unit(1111, "Lakeside Primary", 111).unwrap();
    tree.insert_unit(1112, "Lakeside Secondary", 111).unwrap();
    tree.insert_unit(1121, "Hillcrest Primary", 112).unwrap();
    tree.insert_unit(1211, "Riverton Primary", 121).unwrap();
    tree.insert_unit(2111, "Meadowbrook Primary", 211).unwrap();
    tree
}

/// An active administrator row with the given level and anchor columns.
/// Ancestor columns must be filled the way storage would hold them.
pub fn admin_at(
    level: AdminLevel,
    region_id: Option<i64>,
    division_id: Option<i64>,
    district_id: Option<i64>,
    unit_id: Option<i64>,
) -> Administrator {
    let now = Utc::now();
    Administrator {
        id: Uuid::new_v4(),
        email: format!("{}@census.example.com", level),
        password_digest: String::new(),
        level,
        region_id,
        division_id,
        district_id,
        unit_id,
        can_create_admins: None,
        can_manage_admins: None,
        can_set_deadlines: None,
        can_approve_submissions: None,
        can_view_system_logs: None,
        status: AdminStatus::Active,
        created_by: None,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn nationwide_admin() -> Administrator {
    admin_at(AdminLevel::Nationwide, None, None, None, None)
}

pub fn region_admin(region_id: i64) -> Administrator {
    admin_at(AdminLevel::Region, Some(region_id), None, None, None)
}

pub fn division_admin(region_id: i64, division_id: i64) -> Administrator {
    admin_at(AdminLevel::Division, Some(region_id), Some(division_id), None, None)
}

pub fn district_admin(region_id: i64, division_id: i64, district_id: i64) -> Administrator {
    admin_at(
        AdminLevel::District,
        Some(region_id),
        Some(division_id),
        Some(district_id),
        None,
    )
}

pub fn unit_admin(
    region_id: i64,
    division_id: i64,
    district_id: i64,
    unit_id: i64,
) -> Administrator {
    admin_at(
        AdminLevel::Unit,
        Some(region_id),
        Some(division_id),
        Some(district_id),
        Some(unit_id),
    )
}
