mod common;

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use census_api_rust::completion::{aggregate, compute_completion, QuestionKey, UnitStat};
use census_api_rust::hierarchy::AdminLevel;
use census_api_rust::scope::resolve_scope;

fn key(question_id: i64) -> QuestionKey {
    QuestionKey { question_id, sub_question_id: None }
}

/// Required set of four questions, answers spread unevenly across the
/// five sample units:
///
///   1111 answers all 4, 1112 answers 2, 1121 answers 3,
///   1211 answers 1, 2111 has no submission at all.
fn sample_answers() -> (HashSet<QuestionKey>, HashMap<i64, HashSet<QuestionKey>>) {
    let required: HashSet<_> = (1..=4).map(key).collect();
    let mut answered: HashMap<i64, HashSet<QuestionKey>> = HashMap::new();
    answered.insert(1111, (1..=4).map(key).collect());
    answered.insert(1112, (1..=2).map(key).collect());
    answered.insert(1121, (1..=3).map(key).collect());
    answered.insert(1211, (1..=1).map(key).collect());
    (required, answered)
}

#[test]
fn report_covers_exactly_the_callers_scope() -> Result<()> {
    let tree = common::sample_tree();
    let (required, answered) = sample_answers();

    let division = resolve_scope(&common::division_admin(1, 11), &tree)?;
    let stats = compute_completion(&division.units(&tree)?, &answered, &required);
    let ids: Vec<i64> = stats.iter().map(|s| s.unit_id).collect();
    assert_eq!(ids, vec![1111, 1112, 1121]);

    let nationwide = resolve_scope(&common::nationwide_admin(), &tree)?;
    let stats = compute_completion(&nationwide.units(&tree)?, &answered, &required);
    assert_eq!(stats.len(), 5);

    // The unit with no submission still appears, at zero.
    let silent = stats.iter().find(|s| s.unit_id == 2111).unwrap();
    assert_eq!(silent.answered, 0);
    assert_eq!(silent.completion(), 0.0);
    Ok(())
}

#[test]
fn per_unit_ratios_stay_within_bounds() -> Result<()> {
    let tree = common::sample_tree();
    let (required, mut answered) = sample_answers();

    // Stray answers outside the required set must not push past 1.0.
    answered.get_mut(&1111).unwrap().insert(key(99));
    answered.get_mut(&1111).unwrap().insert(QuestionKey {
        question_id: 1,
        sub_question_id: Some(7),
    });

    let stats = compute_completion(&tree.all_units(), &answered, &required);
    for stat in &stats {
        let c = stat.completion();
        assert!((0.0..=1.0).contains(&c), "unit {} ratio {}", stat.unit_id, c);
    }
    let full = stats.iter().find(|s| s.unit_id == 1111).unwrap();
    assert_eq!(full.answered, 4);
    assert_eq!(full.completion(), 1.0);
    assert_eq!(full.completion_display(), 100.0);
    Ok(())
}

#[test]
fn grouping_walks_every_review_level() -> Result<()> {
    let tree = common::sample_tree();
    let (required, answered) = sample_answers();
    let stats = compute_completion(&tree.all_units(), &answered, &required);

    let districts = aggregate(&tree, &stats, AdminLevel::District)?;
    assert_eq!(districts.len(), 4);
    let lakeside = &districts[0];
    assert_eq!(lakeside.node_id, Some(111));
    assert_eq!(lakeside.name.as_deref(), Some("Lakeside"));
    assert_eq!(lakeside.units, 2);
    assert_eq!(lakeside.answered, 6);
    assert_eq!(lakeside.required, 8);
    assert_eq!(lakeside.completion(), 0.75);
    assert_eq!(lakeside.completion_display(), 75.0);

    let divisions = aggregate(&tree, &stats, AdminLevel::Division)?;
    assert_eq!(divisions.len(), 3);
    let north_east = divisions.iter().find(|g| g.node_id == Some(11)).unwrap();
    assert_eq!(north_east.units, 3);
    assert_eq!(north_east.answered, 9);
    assert_eq!(north_east.required, 12);

    let regions = aggregate(&tree, &stats, AdminLevel::Region)?;
    assert_eq!(regions.len(), 2);
    let north = regions.iter().find(|g| g.node_id == Some(1)).unwrap();
    assert_eq!(north.units, 4);
    assert_eq!(north.answered, 10);
    assert_eq!(north.required, 16);
    let south = regions.iter().find(|g| g.node_id == Some(2)).unwrap();
    assert_eq!(south.answered, 0);

    let nationwide = aggregate(&tree, &stats, AdminLevel::Nationwide)?;
    assert_eq!(nationwide.len(), 1);
    assert_eq!(nationwide[0].node_id, None);
    assert_eq!(nationwide[0].units, 5);
    assert_eq!(nationwide[0].answered, 10);
    assert_eq!(nationwide[0].required, 20);
    assert_eq!(nationwide[0].completion(), 0.5);
    Ok(())
}

#[test]
fn group_totals_are_sums_of_member_totals() -> Result<()> {
    let tree = common::sample_tree();
    let (required, answered) = sample_answers();
    let stats = compute_completion(&tree.all_units(), &answered, &required);

    let unit_answered: u64 = stats.iter().map(|s| s.answered).sum();
    let unit_required: u64 = stats.iter().map(|s| s.required).sum();

    for level in [
        AdminLevel::District,
        AdminLevel::Division,
        AdminLevel::Region,
        AdminLevel::Nationwide,
    ] {
        let groups = aggregate(&tree, &stats, level)?;
        let answered: u64 = groups.iter().map(|g| g.answered).sum();
        let required: u64 = groups.iter().map(|g| g.required).sum();
        let units: u64 = groups.iter().map(|g| g.units).sum();
        assert_eq!(answered, unit_answered, "{level}");
        assert_eq!(required, unit_required, "{level}");
        assert_eq!(units, 5, "{level}");
    }
    Ok(())
}

#[test]
fn empty_required_set_reports_zero_everywhere() -> Result<()> {
    let tree = common::sample_tree();
    let (_, answered) = sample_answers();
    let required = HashSet::new();

    let stats = compute_completion(&tree.all_units(), &answered, &required);
    for stat in &stats {
        assert_eq!(stat.required, 0);
        assert_eq!(stat.completion(), 0.0);
        assert_eq!(stat.completion_display(), 0.0);
    }

    let groups = aggregate(&tree, &stats, AdminLevel::Nationwide)?;
    assert_eq!(groups[0].required, 0);
    assert_eq!(groups[0].completion(), 0.0);
    Ok(())
}

#[test]
fn display_rounds_to_one_decimal_from_the_raw_ratio() {
    let stat = UnitStat { unit_id: 1, answered: 1, required: 3 };
    assert!((stat.completion() - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(stat.completion_display(), 33.3);

    let stat = UnitStat { unit_id: 1, answered: 1, required: 7 };
    assert_eq!(stat.completion_display(), 14.3);

    let stat = UnitStat { unit_id: 1, answered: 1, required: 8 };
    assert_eq!(stat.completion_display(), 12.5);
}
