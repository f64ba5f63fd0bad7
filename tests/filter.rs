mod common;

use common::{article, sample_report};
use crr_viewer::filter::{defects_only, filter, requirements_only};
use crr_viewer::{Field, FilterState, Record};

#[test]
fn blank_state_keeps_everything_in_order() {
    let records = sample_report();
    assert_eq!(filter(&records, &FilterState::default()), vec![0, 1, 2, 3]);
}

#[test]
fn hierarchy_matches_exactly() {
    let records = vec![
        article("PART ONE", "", "", "", "1"),
        article("PART ONE A", "", "", "", "2"),
        article("part one", "", "", "", "3"),
    ];
    let state = FilterState {
        part: "PART ONE".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &state), vec![0]);
}

#[test]
fn nested_selection_narrows() {
    let records = sample_report();
    let state = FilterState {
        part: "PART ONE".to_string(),
        title: "TITLE I".to_string(),
        chapter: "CHAPTER 2".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &state), vec![1]);
}

#[test]
fn text_filters_are_case_insensitive_substrings() {
    let records = sample_report();

    let by_article = FilterState {
        article: "2".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &by_article), vec![1, 2, 3]);

    let by_sas = FilterState {
        sas: "CALC.SAS".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &by_sas), vec![0]);
}

#[test]
fn issue_filter_checks_defects_or_requirements() {
    let records = vec![
        Record::new()
            .with(Field::Article, "1")
            .with(Field::ReferencedInDefects, "CRR-12; not linked")
            .with(Field::ReferencedInReqts, "not found"),
    ];

    let hit = FilterState {
        issue: "crr-12".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &hit), vec![0]);

    let miss = FilterState {
        issue: "crr-99".to_string(),
        ..FilterState::default()
    };
    assert!(filter(&records, &miss).is_empty());

    let sample = sample_report();
    let requirement = FilterState {
        issue: "req-7".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&sample, &requirement), vec![1]);
}

#[test]
fn filters_combine_with_and() {
    let records = sample_report();
    let state = FilterState {
        part: "PART ONE".to_string(),
        issue: "crr".to_string(),
        ..FilterState::default()
    };
    assert_eq!(filter(&records, &state), vec![0]);
}

#[test]
fn reference_views_skip_markers_and_blanks() {
    let records = sample_report();
    let state = FilterState::default();
    assert_eq!(defects_only(&records, &state), vec![0, 3]);
    assert_eq!(requirements_only(&records, &state), vec![1]);

    let part_two = FilterState {
        part: "PART TWO".to_string(),
        ..FilterState::default()
    };
    assert!(requirements_only(&records, &part_two).is_empty());
}

#[test]
fn matches_agrees_with_filter() {
    let records = sample_report();
    let state = FilterState {
        title: "TITLE I".to_string(),
        ..FilterState::default()
    };
    let by_predicate: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| state.matches(record))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(by_predicate, filter(&records, &state));
}
