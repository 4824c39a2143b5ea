use std::collections::HashMap;

use thiserror::Error;

use super::level::AdminLevel;

/// Errors from tree construction and lookups
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Unknown region: {0}")]
    UnknownRegion(i64),

    #[error("Unknown division: {0}")]
    UnknownDivision(i64),

    #[error("Unknown district: {0}")]
    UnknownDistrict(i64),

    #[error("Unknown unit: {0}")]
    UnknownUnit(i64),

    #[error("Duplicate {level} id: {id}")]
    DuplicateNode { level: AdminLevel, id: i64 },
}

/// Reference to a node at a specific level of the hierarchy.
///
/// Node ids are unique per level, not globally, so a bare id is
/// meaningless without the level that qualifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Region(i64),
    Division(i64),
    District(i64),
    Unit(i64),
}

impl NodeRef {
    #[must_use]
    pub fn level(&self) -> AdminLevel {
        match self {
            Self::Region(_) => AdminLevel::Region,
            Self::Division(_) => AdminLevel::Division,
            Self::District(_) => AdminLevel::District,
            Self::Unit(_) => AdminLevel::Unit,
        }
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Region(id) | Self::Division(id) | Self::District(id) | Self::Unit(id) => *id,
        }
    }

    /// Build a node reference for a level below nationwide.
    pub fn at(level: AdminLevel, id: i64) -> Option<Self> {
        match level {
            AdminLevel::Region => Some(Self::Region(id)),
            AdminLevel::Division => Some(Self::Division(id)),
            AdminLevel::District => Some(Self::District(id)),
            AdminLevel::Unit => Some(Self::Unit(id)),
            AdminLevel::Nationwide => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Region {
    name: String,
}

#[derive(Debug, Clone)]
struct Division {
    name: String,
    region_id: i64,
}

#[derive(Debug, Clone)]
struct District {
    name: String,
    division_id: i64,
}

#[derive(Debug, Clone)]
struct Unit {
    name: String,
    district_id: i64,
}

/// In-memory snapshot of the four-level geographic hierarchy.
///
/// The nationwide root is implicit. Parent pointers are validated at
/// insertion so every parent chain is acyclic and terminates at a region.
/// The tree is immutable once loaded for a request.
#[derive(Debug, Default, Clone)]
pub struct GeographicTree {
    regions: HashMap<i64, Region>,
    divisions: HashMap<i64, Division>,
    districts: HashMap<i64, District>,
    units: HashMap<i64, Unit>,
}

impl GeographicTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_region(&mut self, id: i64, name: impl Into<String>) -> Result<(), GeoError> {
        if self.regions.contains_key(&id) {
            return Err(GeoError::DuplicateNode { level: AdminLevel::Region, id });
        }
        self.regions.insert(id, Region { name: name.into() });
        Ok(())
    }

    pub fn insert_division(
        &mut self,
        id: i64,
        name: impl Into<String>,
        region_id: i64,
    ) -> Result<(), GeoError> {
        if !self.regions.contains_key(&region_id) {
            return Err(GeoError::UnknownRegion(region_id));
        }
        if self.divisions.contains_key(&id) {
            return Err(GeoError::DuplicateNode { level: AdminLevel::Division, id });
        }
        self.divisions.insert(id, Division { name: name.into(), region_id });
        Ok(())
    }

    pub fn insert_district(
        &mut self,
        id: i64,
        name: impl Into<String>,
        division_id: i64,
    ) -> Result<(), GeoError> {
        if !self.divisions.contains_key(&division_id) {
            return Err(GeoError::UnknownDivision(division_id));
        }
        if self.districts.contains_key(&id) {
            return Err(GeoError::DuplicateNode { level: AdminLevel::District, id });
        }
        self.districts.insert(id, District { name: name.into(), division_id });
        Ok(())
    }

    pub fn insert_unit(
        &mut self,
        id: i64,
        name: impl Into<String>,
        district_id: i64,
    ) -> Result<(), GeoError> {
        if !self.districts.contains_key(&district_id) {
            return Err(GeoError::UnknownDistrict(district_id));
        }
        if self.units.contains_key(&id) {
            return Err(GeoError::DuplicateNode { level: AdminLevel::Unit, id });
        }
        self.units.insert(id, Unit { name: name.into(), district_id });
        Ok(())
    }

    /// True if a node with this reference exists.
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Region(id) => self.regions.contains_key(&id),
            NodeRef::Division(id) => self.divisions.contains_key(&id),
            NodeRef::District(id) => self.districts.contains_key(&id),
            NodeRef::Unit(id) => self.units.contains_key(&id),
        }
    }

    /// Display name for a node, if present.
    #[must_use]
    pub fn name_of(&self, node: NodeRef) -> Option<&str> {
        match node {
            NodeRef::Region(id) => self.regions.get(&id).map(|n| n.name.as_str()),
            NodeRef::Division(id) => self.divisions.get(&id).map(|n| n.name.as_str()),
            NodeRef::District(id) => self.districts.get(&id).map(|n| n.name.as_str()),
            NodeRef::Unit(id) => self.units.get(&id).map(|n| n.name.as_str()),
        }
    }

    /// Parent of a node. Regions have no parent (the nationwide root is
    /// implicit). Errors when the node itself is unknown.
    pub fn parent(&self, node: NodeRef) -> Result<Option<NodeRef>, GeoError> {
        match node {
            NodeRef::Region(id) => {
                if self.regions.contains_key(&id) {
                    Ok(None)
                } else {
                    Err(GeoError::UnknownRegion(id))
                }
            }
            NodeRef::Division(id) => self
                .divisions
                .get(&id)
                .map(|d| Some(NodeRef::Region(d.region_id)))
                .ok_or(GeoError::UnknownDivision(id)),
            NodeRef::District(id) => self
                .districts
                .get(&id)
                .map(|d| Some(NodeRef::Division(d.division_id)))
                .ok_or(GeoError::UnknownDistrict(id)),
            NodeRef::Unit(id) => self
                .units
                .get(&id)
                .map(|u| Some(NodeRef::District(u.district_id)))
                .ok_or(GeoError::UnknownUnit(id)),
        }
    }

    /// Ancestor of `node` at `level`, walking parent pointers upward.
    ///
    /// Returns the node itself when `level` equals the node's own level,
    /// and `None` when `level` is below the node.
    pub fn ancestor_at(&self, node: NodeRef, level: AdminLevel) -> Result<Option<NodeRef>, GeoError> {
        if level == node.level() {
            if !self.contains(node) {
                return Err(self.unknown(node));
            }
            return Ok(Some(node));
        }
        if level < node.level() || level == AdminLevel::Nationwide {
            return Ok(None);
        }
        let mut current = node;
        while let Some(parent) = self.parent(current)? {
            if parent.level() == level {
                return Ok(Some(parent));
            }
            current = parent;
        }
        Ok(None)
    }

    /// True iff `node` equals `ancestor` or sits in its subtree.
    pub fn is_self_or_descendant(&self, node: NodeRef, ancestor: NodeRef) -> Result<bool, GeoError> {
        Ok(self.ancestor_at(node, ancestor.level())? == Some(ancestor))
    }

    /// All unit ids under a node (the node's own id when it is a unit).
    pub fn units_under(&self, node: NodeRef) -> Result<Vec<i64>, GeoError> {
        if !self.contains(node) {
            return Err(self.unknown(node));
        }
        let mut out: Vec<i64> = self
            .units
            .iter()
            .filter_map(|(id, _)| {
                let unit = NodeRef::Unit(*id);
                match self.is_self_or_descendant(unit, node) {
                    Ok(true) => Some(*id),
                    _ => None,
                }
            })
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Every unit id in the tree, sorted.
    #[must_use]
    pub fn all_units(&self) -> Vec<i64> {
        let mut out: Vec<i64> = self.units.keys().copied().collect();
        out.sort_unstable();
        out
    }

    #[must_use]
    pub fn region_ids(&self) -> Vec<i64> {
        let mut out: Vec<i64> = self.regions.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Division ids directly under a region.
    pub fn divisions_in(&self, region_id: i64) -> Result<Vec<i64>, GeoError> {
        if !self.regions.contains_key(&region_id) {
            return Err(GeoError::UnknownRegion(region_id));
        }
        let mut out: Vec<i64> = self
            .divisions
            .iter()
            .filter(|(_, d)| d.region_id == region_id)
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// District ids directly under a division.
    pub fn districts_in(&self, division_id: i64) -> Result<Vec<i64>, GeoError> {
        if !self.divisions.contains_key(&division_id) {
            return Err(GeoError::UnknownDivision(division_id));
        }
        let mut out: Vec<i64> = self
            .districts
            .iter()
            .filter(|(_, d)| d.division_id == division_id)
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Unit ids directly under a district.
    pub fn units_in_district(&self, district_id: i64) -> Result<Vec<i64>, GeoError> {
        if !self.districts.contains_key(&district_id) {
            return Err(GeoError::UnknownDistrict(district_id));
        }
        let mut out: Vec<i64> = self
            .units
            .iter()
            .filter(|(_, u)| u.district_id == district_id)
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    #[must_use]
    pub fn node_counts(&self) -> (usize, usize, usize, usize) {
        (
            self.regions.len(),
            self.divisions.len(),
            self.districts.len(),
            self.units.len(),
        )
    }

    fn unknown(&self, node: NodeRef) -> GeoError {
        match node {
            NodeRef::Region(id) => GeoError::UnknownRegion(id),
            NodeRef::Division(id) => GeoError::UnknownDivision(id),
            NodeRef::District(id) => GeoError::UnknownDistrict(id),
            NodeRef::Unit(id) => GeoError::UnknownUnit(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeographicTree {
        let mut tree = GeographicTree::new();
        tree.insert_region(1, "North").unwrap();
        tree.insert_region(2, "South").unwrap();
        tree.insert_division(10, "D1", 1).unwrap();
        tree.insert_division(11, "D2", 1).unwrap();
        tree.insert_division(20, "D3", 2).unwrap();
        tree.insert_district(100, "T1", 10).unwrap();
        tree.insert_district(101, "T2", 10).unwrap();
        tree.insert_district(110, "T3", 11).unwrap();
        tree.insert_unit(1000, "U1", 100).unwrap();
        tree.insert_unit(1001, "U2", 100).unwrap();
        tree.insert_unit(1010, "U3", 101).unwrap();
        tree.insert_unit(1100, "U4", 110).unwrap();
        tree
    }

    #[test]
    fn rejects_orphan_inserts() {
        let mut tree = GeographicTree::new();
        assert!(matches!(
            tree.insert_division(10, "D1", 99),
            Err(GeoError::UnknownRegion(99))
        ));
        tree.insert_region(1, "North").unwrap();
        assert!(matches!(
            tree.insert_unit(1000, "U1", 55),
            Err(GeoError::UnknownDistrict(55))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut tree = sample();
        assert!(matches!(
            tree.insert_region(1, "Other"),
            Err(GeoError::DuplicateNode { level: AdminLevel::Region, id: 1 })
        ));
    }

    #[test]
    fn parent_chain_terminates_at_region() {
        let tree = sample();
        let mut node = NodeRef::Unit(1000);
        let mut hops = 0;
        while let Some(parent) = tree.parent(node).unwrap() {
            node = parent;
            hops += 1;
        }
        assert_eq!(node, NodeRef::Region(1));
        assert_eq!(hops, 3);
    }

    #[test]
    fn ancestor_lookup() {
        let tree = sample();
        assert_eq!(
            tree.ancestor_at(NodeRef::Unit(1000), AdminLevel::Division).unwrap(),
            Some(NodeRef::Division(10))
        );
        assert_eq!(
            tree.ancestor_at(NodeRef::Unit(1100), AdminLevel::Region).unwrap(),
            Some(NodeRef::Region(1))
        );
        // A node is its own ancestor at its own level
        assert_eq!(
            tree.ancestor_at(NodeRef::District(100), AdminLevel::District).unwrap(),
            Some(NodeRef::District(100))
        );
        // No ancestor below the node's level
        assert_eq!(
            tree.ancestor_at(NodeRef::Region(1), AdminLevel::Unit).unwrap(),
            None
        );
    }

    #[test]
    fn units_under_collects_subtree() {
        let tree = sample();
        assert_eq!(tree.units_under(NodeRef::Division(10)).unwrap(), vec![1000, 1001, 1010]);
        assert_eq!(tree.units_under(NodeRef::District(110)).unwrap(), vec![1100]);
        assert_eq!(tree.units_under(NodeRef::Unit(1001)).unwrap(), vec![1001]);
        assert_eq!(tree.units_under(NodeRef::Region(2)).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn descendant_check_excludes_siblings() {
        let tree = sample();
        assert!(tree
            .is_self_or_descendant(NodeRef::District(100), NodeRef::Division(10))
            .unwrap());
        assert!(!tree
            .is_self_or_descendant(NodeRef::District(110), NodeRef::Division(10))
            .unwrap());
    }
}
