mod common;

use common::sample_report;
use crr_viewer::render::{RenderSettings, UPLOAD_NOTICE};
use crr_viewer::viewer::ActionState;
use crr_viewer::{TextFilters, Viewer, ViewerError, loader};
use std::io::Write;

fn loaded() -> Viewer {
    let mut viewer = Viewer::new(RenderSettings::default());
    viewer.load(sample_report());
    viewer
}

#[test]
fn new_viewer_waits_for_upload() {
    let viewer = Viewer::default();
    let state = viewer.state();
    assert!(!state.loaded);
    assert!(!state.controls_enabled);
    assert_eq!(state.actions, ActionState::default());
    assert!(state.selectors.iter().all(|selector| !selector.enabled));
    assert_eq!(viewer.table().notice.as_deref(), Some(UPLOAD_NOTICE));
    assert!(matches!(viewer.summary(), Err(ViewerError::NoDataset)));
}

#[test]
fn load_shows_every_row() {
    let viewer = loaded();
    assert_eq!(viewer.displayed(), Some(&[0, 1, 2, 3][..]));
    let state = viewer.state();
    assert!(state.controls_enabled);
    assert_eq!(state.total_rows, 4);
    assert_eq!(state.displayed_rows, Some(4));
    assert!(state.actions.visuals && state.actions.export_pdf && state.actions.export_xlsx);
    assert!(state.selectors[0].enabled);
}

#[test]
fn selection_applies_on_demand() {
    let mut viewer = loaded();
    viewer.select(0, "PART TWO").unwrap();
    assert_eq!(viewer.displayed().map(<[usize]>::len), Some(4));

    assert_eq!(viewer.apply(), &[3]);
    assert_eq!(viewer.table().rows.len(), 1);
}

#[test]
fn text_filters_apply_immediately() {
    let mut viewer = loaded();
    viewer
        .set_text_filters(TextFilters {
            issue: "crr-".to_string(),
            ..TextFilters::default()
        })
        .unwrap();
    assert_eq!(viewer.displayed(), Some(&[0, 3][..]));
}

#[test]
fn no_match_disables_actions() {
    let mut viewer = loaded();
    viewer
        .set_text_filters(TextFilters {
            article: "nothing like this".to_string(),
            ..TextFilters::default()
        })
        .unwrap();
    assert_eq!(viewer.actions(), ActionState::default());
    assert!(viewer.table().notice.is_some());
}

#[test]
fn reference_views_respect_active_filters() {
    let mut viewer = loaded();
    viewer.select(0, "PART ONE").unwrap();
    assert_eq!(viewer.show_defects_only().unwrap(), &[0]);
    assert_eq!(viewer.show_requirements_only().unwrap(), &[1]);
}

#[test]
fn reset_clears_everything() {
    let mut viewer = loaded();
    viewer.select(0, "PART ONE").unwrap();
    viewer.select(1, "TITLE II").unwrap();
    viewer
        .set_text_filters(TextFilters {
            sas: "calc".to_string(),
            ..TextFilters::default()
        })
        .unwrap();

    viewer.reset().unwrap();
    assert_eq!(viewer.text_filters(), &TextFilters::default());
    assert_eq!(viewer.cascade().selections(), ["", "", "", ""]);
    assert_eq!(viewer.displayed(), Some(&[0, 1, 2, 3][..]));
}

#[test]
fn actions_need_a_dataset() {
    let mut viewer = Viewer::default();
    assert!(matches!(viewer.select(0, "PART ONE"), Err(ViewerError::NoDataset)));
    assert!(matches!(viewer.reset(), Err(ViewerError::NoDataset)));
    assert!(matches!(viewer.show_defects_only(), Err(ViewerError::NoDataset)));
    assert!(matches!(
        viewer.set_text_filters(TextFilters::default()),
        Err(ViewerError::NoDataset)
    ));
    // Column visibility can be changed before upload.
    viewer.set_column_visible(3, true).unwrap();
    assert!(viewer.columns().all()[3].visible);
}

#[test]
fn column_toggle_redraws_with_current_filters() {
    let mut viewer = loaded();
    viewer.select(0, "PART TWO").unwrap();
    viewer.apply();
    viewer.set_column_visible(0, false).unwrap();

    let table = viewer.table();
    assert_eq!(table.headers.len(), 6);
    assert_eq!(table.rows.len(), 1);
    assert!(matches!(viewer.set_column_visible(8, true), Err(ViewerError::InvalidColumn(8))));
}

#[test]
fn reload_replaces_state() {
    let mut viewer = loaded();
    viewer.select(0, "PART ONE").unwrap();
    viewer.load(sample_report()[..2].to_vec());

    assert_eq!(viewer.records().len(), 2);
    assert_eq!(viewer.cascade().selections(), ["", "", "", ""]);
    assert_eq!(viewer.displayed(), Some(&[0, 1][..]));
    assert_eq!(viewer.summary().unwrap().support.total(), 2);
}

#[test]
fn failed_import_leaves_the_viewer_unloaded() {
    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(b"this is not a workbook").unwrap();

    let mut viewer = loaded();
    match loader::load_file(file.path()) {
        Ok(records) => viewer.load(records),
        Err(_) => viewer.unload(),
    }

    assert!(!viewer.is_loaded());
    assert!(!viewer.state().controls_enabled);
    assert_eq!(viewer.actions(), ActionState::default());
    assert_eq!(viewer.table().notice.as_deref(), Some(UPLOAD_NOTICE));
}

#[test]
fn header_only_workbook_summarizes_to_zero() {
    let mut viewer = Viewer::default();
    viewer.load(Vec::new());
    assert!(viewer.is_loaded());

    let summary = viewer.summary().unwrap();
    assert_eq!(summary.support.total(), 0);
    assert!(summary.top_files.is_empty());
    assert_eq!(summary.issues.with_issues + summary.issues.without_issues, 0);
    assert_eq!(viewer.state().displayed_rows, Some(0));
}
