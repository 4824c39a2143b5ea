use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::hierarchy::{AdminLevel, GeoError, GeographicTree, NodeRef};

/// Identity of a required question, optionally narrowed to a sub-question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionKey {
    pub question_id: i64,
    pub sub_question_id: Option<i64>,
}

/// Per-unit completion figures for one reporting period.
///
/// `completion` keeps the unrounded ratio; only `completion_display`
/// rounds, so repeated aggregation is stable under re-rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitStat {
    pub unit_id: i64,
    pub answered: u64,
    pub required: u64,
}

impl UnitStat {
    /// Ratio of answered to required, zero when nothing is required.
    #[must_use]
    pub fn completion(&self) -> f64 {
        ratio(self.answered, self.required)
    }

    /// Percentage rounded to one decimal place, for display only.
    #[must_use]
    pub fn completion_display(&self) -> f64 {
        round_percent(self.completion())
    }
}

/// Roll-up of member-unit stats at one grouping level.
///
/// `node` is `None` only for the single nationwide group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub level: AdminLevel,
    pub node_id: Option<i64>,
    pub name: Option<String>,
    pub units: u64,
    pub answered: u64,
    pub required: u64,
}

impl GroupStat {
    #[must_use]
    pub fn completion(&self) -> f64 {
        ratio(self.answered, self.required)
    }

    #[must_use]
    pub fn completion_display(&self) -> f64 {
        round_percent(self.completion())
    }
}

fn ratio(answered: u64, required: u64) -> f64 {
    if required == 0 {
        0.0
    } else {
        answered as f64 / required as f64
    }
}

fn round_percent(completion: f64) -> f64 {
    (completion * 1000.0).round() / 10.0
}

/// Per-unit stats for every unit in `units`.
///
/// `answered_by_unit` holds the non-empty answer keys of each unit's
/// latest submission; only keys present in `required` count. Units with
/// no submission yet still appear, with zero answered.
#[must_use]
pub fn compute_completion(
    units: &[i64],
    answered_by_unit: &HashMap<i64, HashSet<QuestionKey>>,
    required: &HashSet<QuestionKey>,
) -> Vec<UnitStat> {
    units
        .iter()
        .map(|&unit_id| {
            let answered = answered_by_unit
                .get(&unit_id)
                .map_or(0, |keys| keys.intersection(required).count() as u64);
            UnitStat {
                unit_id,
                answered,
                required: required.len() as u64,
            }
        })
        .collect()
}

/// Roll per-unit stats up to `level`, grouping each unit by its ancestor
/// at that level. Nationwide produces a single group with no node.
///
/// Group figures are sums of member figures; the ratio is recomputed
/// from the sums, never averaged from member ratios.
pub fn aggregate(
    tree: &GeographicTree,
    stats: &[UnitStat],
    level: AdminLevel,
) -> Result<Vec<GroupStat>, GeoError> {
    if level == AdminLevel::Nationwide {
        let (answered, required) = stats
            .iter()
            .fold((0, 0), |(a, r), s| (a + s.answered, r + s.required));
        return Ok(vec![GroupStat {
            level,
            node_id: None,
            name: None,
            units: stats.len() as u64,
            answered,
            required,
        }]);
    }

    let mut groups: BTreeMap<i64, GroupStat> = BTreeMap::new();
    for stat in stats {
        let ancestor = tree.ancestor_at(NodeRef::Unit(stat.unit_id), level)?;
        let Some(ancestor) = ancestor else {
            return Err(GeoError::UnknownUnit(stat.unit_id));
        };
        let group = groups.entry(ancestor.id()).or_insert_with(|| GroupStat {
            level,
            node_id: Some(ancestor.id()),
            name: tree.name_of(ancestor).map(str::to_owned),
            units: 0,
            answered: 0,
            required: 0,
        });
        group.units += 1;
        group.answered += stat.answered;
        group.required += stat.required;
    }
    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(question_id: i64) -> QuestionKey {
        QuestionKey { question_id, sub_question_id: None }
    }

    fn tree() -> GeographicTree {
        let mut tree = GeographicTree::new();
        tree.insert_region(1, "R1").unwrap();
        tree.insert_division(10, "D1", 1).unwrap();
        tree.insert_division(11, "D2", 1).unwrap();
        tree.insert_district(100, "T1", 10).unwrap();
        tree.insert_district(110, "T2", 11).unwrap();
        for unit in 0..10 {
            let district = if unit < 5 { 100 } else { 110 };
            tree.insert_unit(1000 + unit, format!("U{unit}"), district).unwrap();
        }
        tree
    }

    #[test]
    fn unit_without_submission_counts_as_zero() {
        let required: HashSet<_> = (1..=3).map(key).collect();
        let mut answered = HashMap::new();
        answered.insert(1000, [key(1), key(2)].into_iter().collect());

        let stats = compute_completion(&[1000, 1001], &answered, &required);
        assert_eq!(stats[0], UnitStat { unit_id: 1000, answered: 2, required: 3 });
        assert_eq!(stats[1], UnitStat { unit_id: 1001, answered: 0, required: 3 });
    }

    #[test]
    fn answers_outside_required_set_do_not_count() {
        let required: HashSet<_> = [key(1)].into_iter().collect();
        let mut answered = HashMap::new();
        answered.insert(1000, [key(1), key(99)].into_iter().collect());

        let stats = compute_completion(&[1000], &answered, &required);
        assert_eq!(stats[0].answered, 1);
        assert!(stats[0].completion() <= 1.0);
    }

    #[test]
    fn sub_question_keys_are_distinct() {
        let with_sub = QuestionKey { question_id: 1, sub_question_id: Some(7) };
        let required: HashSet<_> = [key(1), with_sub].into_iter().collect();
        let mut answered = HashMap::new();
        answered.insert(1000, [key(1)].into_iter().collect());

        let stats = compute_completion(&[1000], &answered, &required);
        assert_eq!(stats[0], UnitStat { unit_id: 1000, answered: 1, required: 2 });
    }

    #[test]
    fn zero_required_yields_zero_without_error() {
        let stat = UnitStat { unit_id: 1, answered: 0, required: 0 };
        assert_eq!(stat.completion(), 0.0);
        assert_eq!(stat.completion_display(), 0.0);
    }

    #[test]
    fn empty_scope_yields_empty_stats() {
        let required: HashSet<_> = (1..=3).map(key).collect();
        let stats = compute_completion(&[], &HashMap::new(), &required);
        assert!(stats.is_empty());
    }

    #[test]
    fn nationwide_roll_up_matches_hand_computation() {
        // 10 units, 20 required questions; 6 answer all, 4 answer half.
        let tree = tree();
        let required: HashSet<_> = (1..=20).map(key).collect();
        let mut answered: HashMap<i64, HashSet<QuestionKey>> = HashMap::new();
        for unit in 0..10i64 {
            let count = if unit < 6 { 20 } else { 10 };
            answered.insert(1000 + unit, (1..=count).map(key).collect());
        }
        let units: Vec<i64> = (1000..1010).collect();
        let stats = compute_completion(&units, &answered, &required);

        let groups = aggregate(&tree, &stats, AdminLevel::Nationwide).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].node_id, None);
        assert_eq!(groups[0].answered, 160);
        assert_eq!(groups[0].required, 200);
        assert_eq!(groups[0].completion(), 0.80);
        assert_eq!(groups[0].completion_display(), 80.0);
    }

    #[test]
    fn district_grouping_splits_by_ancestor() {
        let tree = tree();
        let stats: Vec<UnitStat> = (0..10)
            .map(|unit| UnitStat { unit_id: 1000 + unit, answered: unit as u64, required: 10 })
            .collect();

        let groups = aggregate(&tree, &stats, AdminLevel::District).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].node_id, Some(100));
        assert_eq!(groups[0].name.as_deref(), Some("T1"));
        assert_eq!(groups[0].units, 5);
        assert_eq!(groups[0].answered, 10);
        assert_eq!(groups[1].node_id, Some(110));
        assert_eq!(groups[1].answered, 35);
    }

    #[test]
    fn aggregation_is_additive_over_members() {
        let tree = tree();
        let stats: Vec<UnitStat> = (0..10)
            .map(|unit| UnitStat { unit_id: 1000 + unit, answered: 7, required: 9 })
            .collect();

        for level in [AdminLevel::District, AdminLevel::Division, AdminLevel::Region] {
            let groups = aggregate(&tree, &stats, level).unwrap();
            let answered: u64 = groups.iter().map(|g| g.answered).sum();
            let required: u64 = groups.iter().map(|g| g.required).sum();
            assert_eq!(answered, 70, "{level}");
            assert_eq!(required, 90, "{level}");
        }
    }

    #[test]
    fn unknown_unit_in_stats_is_an_error() {
        let tree = tree();
        let stats = [UnitStat { unit_id: 9999, answered: 1, required: 2 }];
        let err = aggregate(&tree, &stats, AdminLevel::Region).unwrap_err();
        assert!(matches!(err, GeoError::UnknownUnit(9999)));
    }

    #[test]
    fn display_rounding_is_one_decimal() {
        let stat = UnitStat { unit_id: 1, answered: 1, required: 3 };
        assert_eq!(stat.completion_display(), 33.3);
        let stat = UnitStat { unit_id: 1, answered: 2, required: 3 };
        assert_eq!(stat.completion_display(), 66.7);
    }
}
