mod common;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use common::sample_report;
use crr_viewer::downloader::{XLSX_SHEET_NAME, export_rows, pdf_table, to_pdf, to_xlsx};
use crr_viewer::render::RenderSettings;
use crr_viewer::{Field, Record, Table, Viewer, ViewerError, loader};
use lopdf::Object;
use std::io::Cursor;

fn loaded() -> Viewer {
    let mut viewer = Viewer::new(RenderSettings::default());
    viewer.load(sample_report());
    viewer
}

#[test]
fn export_rows_follow_visible_columns() {
    let mut viewer = loaded();
    viewer.set_column_visible(2, false).unwrap();
    viewer.set_column_visible(3, true).unwrap();

    let (headers, rows) = export_rows(viewer.records(), &viewer.table(), viewer.columns());
    assert_eq!(
        headers,
        [
            "Article",
            "Article Name",
            "Out of scope",
            "Referenced_In_SAS",
            "Referenced_In_TXT",
            "Referenced_In_Defects",
            "Referenced_In_Reqts"
        ]
    );
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2][2], "out of scope");
    // Raw values, not rendered text.
    assert_eq!(rows[0][5], "CRR-12; not linked");
}

#[test]
fn xlsx_holds_only_visible_columns() {
    let mut viewer = loaded();
    viewer.select(0, "PART ONE").unwrap();
    viewer.apply();
    for index in [1, 2, 5, 6, 7] {
        viewer.set_column_visible(index, false).unwrap();
    }

    let bytes = to_xlsx(viewer.records(), &viewer.table(), viewer.columns()).unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), [XLSX_SHEET_NAME]);

    let range = workbook.worksheet_range(XLSX_SHEET_NAME).unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], [Data::String("Article".into()), Data::String("Referenced_In_SAS".into())]);
    assert_eq!(rows[1][0], Data::String("1".into()));
    assert_eq!(rows[2][1], Data::String("not found".into()));
    assert_eq!(rows[3][1], Data::String("out of scope".into()));
}

#[test]
fn exported_workbook_loads_back() {
    let viewer = loaded();
    let bytes = to_xlsx(viewer.records(), &viewer.table(), viewer.columns()).unwrap();
    let records = loader::from_bytes("crr_full_report_filtered.xlsx", bytes).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].get(Field::Article), "92");
    assert_eq!(records[3].get(Field::PartName), "");
}

#[test]
fn pdf_is_a_document() {
    let viewer = loaded();
    let bytes = to_pdf(&viewer.table()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));

    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), 1);
}

#[test]
fn long_tables_paginate() {
    let headers = vec!["Article".to_string(), "Article Content".to_string()];
    let rows: Vec<Vec<String>> = (0..300)
        .map(|i| vec![i.to_string(), "words ".repeat(40)])
        .collect();
    let bytes = pdf_table("Consolidated CRR Report", &headers, &rows).unwrap();
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(document.get_pages().len() > 1);
}

#[test]
fn rows_taller_than_a_page_continue_on_the_next() {
    let content = format!("{}finis", "lorem ipsum dolor ".repeat(500));
    let mut viewer = Viewer::new(RenderSettings::default());
    viewer.load(vec![
        Record::new()
            .with(Field::Article, "92")
            .with(Field::ArticleContent, content.as_str()),
    ]);

    let bytes = to_pdf(&viewer.table()).unwrap();
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = document.get_pages();
    assert!(pages.len() > 1);

    let mut lowest = f32::MAX;
    let mut last_line = Vec::new();
    for page_id in pages.values() {
        let content = document.get_and_decode_page_content(*page_id).unwrap();
        for operation in &content.operations {
            match operation.operator.as_str() {
                "Td" => lowest = lowest.min(operation.operands[1].as_float().unwrap()),
                "Tj" => {
                    if let Object::String(text, _) = &operation.operands[0] {
                        last_line = text.clone();
                    }
                }
                _ => {}
            }
        }
    }
    assert!(lowest >= 0.0, "text drawn below the page at y={lowest}");
    assert!(String::from_utf8_lossy(&last_line).ends_with("finis"));
}

#[test]
fn nothing_displayed_cannot_be_exported() {
    let mut viewer = loaded();
    viewer.select(0, "PART TWO").unwrap();
    viewer.select(1, "TITLE I").unwrap();
    viewer.select(2, "CHAPTER 1").unwrap();
    viewer.select(3, "SECTION 2").unwrap();
    viewer
        .set_text_filters(crr_viewer::TextFilters {
            article: "1".to_string(),
            ..Default::default()
        })
        .unwrap();
    let table = viewer.table();
    assert!(table.rows.is_empty());

    assert!(matches!(to_pdf(&table), Err(ViewerError::NothingDisplayed)));
    assert!(matches!(
        to_xlsx(viewer.records(), &table, viewer.columns()),
        Err(ViewerError::NothingDisplayed)
    ));
    assert!(matches!(
        to_pdf(&Table::awaiting_upload(viewer.columns())),
        Err(ViewerError::NothingDisplayed)
    ));
}

#[test]
fn csv_and_workbook_files_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("report.csv");
    std::fs::write(
        &csv_path,
        "Part Name,Article,Referenced_In_SAS\nPART ONE,1,a.sas|3\nPART TWO,2,not found\n",
    )
    .unwrap();
    let records = loader::load_file(&csv_path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get(Field::ReferencedInSas), "a.sas|3");

    let viewer = loaded();
    let xlsx_path = dir.path().join("report.xlsx");
    std::fs::write(
        &xlsx_path,
        to_xlsx(viewer.records(), &viewer.table(), viewer.columns()).unwrap(),
    )
    .unwrap();
    assert_eq!(loader::load_file(&xlsx_path).unwrap().len(), 4);

    assert!(matches!(
        loader::load_file(dir.path().join("report")),
        Err(ViewerError::UnsupportedFormat(_))
    ));
}
