use crate::columns::ColumnConfig;
use crate::error::{Result, ViewerError};
use crate::record::{Field, Record};
use crate::render::Table;
use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

pub const PDF_FILE_NAME: &str = "crr_full_report.pdf";
pub const XLSX_FILE_NAME: &str = "crr_full_report_filtered.xlsx";
pub const PDF_TITLE: &str = "Consolidated CRR Report";
pub const XLSX_SHEET_NAME: &str = "Filtered Report";

/// Rows for the spreadsheet export
///
/// Each displayed row is traced back to its source record by matching the
/// first visible column's text against the Article field, so Article has to
/// stay the first column for the lookup to find anything. Rows whose key
/// text is empty are skipped; rows whose key matches no record export blank
/// values.
///
/// # Returns
/// * `(Vec<&'static str>, Vec<Vec<String>>)` - Header keys and row values
pub fn export_rows(
    records: &[Record],
    table: &Table,
    columns: &ColumnConfig,
) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let fields: Vec<Field> = columns.visible().map(|column| column.field).collect();
    let headers = fields.iter().map(|field| field.key()).collect();

    let rows = table
        .rows
        .iter()
        .filter_map(|row| {
            let article = row.first()?.plain_text();
            if article.is_empty() {
                return None;
            }
            let source = records
                .iter()
                .find(|record| record.get(Field::Article) == article);
            Some(
                fields
                    .iter()
                    .map(|field| {
                        source
                            .map(|record| record.get(*field).to_string())
                            .unwrap_or_default()
                    })
                    .collect(),
            )
        })
        .collect();

    (headers, rows)
}

/// Convert the displayed view to XLSX format
///
/// Writes one sheet named "Filtered Report" holding only the visible
/// columns, with the field keys as the header row.
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
pub fn to_xlsx(records: &[Record], table: &Table, columns: &ColumnConfig) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let (headers, rows) = export_rows(records, table, columns);
    if rows.is_empty() {
        return Err(ViewerError::NothingDisplayed);
    }

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(XLSX_SHEET_NAME)?;

    for (c, header) in headers.iter().enumerate() {
        worksheet.write_string(0, c as u16, *header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string((r + 1) as u32, c as u16, value.as_str())?;
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;
    info!("exported {} rows to XLSX", rows.len());
    Ok(buffer)
}

// Landscape A4 in points.
const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 28.0;
const TABLE_TOP: f32 = 40.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 5.0;
const LINE_HEIGHT: f32 = 6.0;
const CELL_PADDING: f32 = 2.0;
// Average Helvetica glyph width relative to the font size.
const GLYPH_WIDTH: f32 = 0.5;

/// Convert the displayed view to a PDF document
///
/// Produces a landscape A4 document with the report title at the top of
/// every page and the visible columns laid out as a small-font table whose
/// header row repeats on each page. Cell text is the plain text of the
/// rendered cell with whitespace runs collapsed.
///
/// # Returns
/// * `Result<Vec<u8>>` - PDF file content as bytes or an error
pub fn to_pdf(table: &Table) -> Result<Vec<u8>> {
    if table.rows.is_empty() {
        return Err(ViewerError::NothingDisplayed);
    }
    let rows = table.text_rows();
    let buffer = pdf_table(PDF_TITLE, &table.headers, &rows)?;
    info!("exported {} rows to PDF", rows.len());
    Ok(buffer)
}

/// Lays out `rows` under `headers` and returns the encoded document.
pub fn pdf_table(title: &str, headers: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let columns = headers.len().max(1);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
    let max_chars = (((column_width - 2.0 * CELL_PADDING) / (BODY_SIZE * GLYPH_WIDTH)) as usize).max(1);

    let wrap_row = |cells: &[String]| -> Vec<Vec<String>> {
        cells.iter().map(|cell| wrap(cell, max_chars)).collect()
    };
    let header = wrap_row(headers);
    let body: Vec<Vec<Vec<String>>> = rows.iter().map(|row| wrap_row(row.as_slice())).collect();

    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut ops = page_start(title);
    let header_top = PAGE_HEIGHT - TABLE_TOP;
    let mut y = draw_row(&mut ops, &header, header_top, column_width, "F2");
    let page_room = header_top - row_height(&header) - MARGIN;
    let mut fresh = true;
    for mut row in body {
        loop {
            let height = row_height(&row);
            if y - height >= MARGIN || (fresh && height <= page_room) {
                y = draw_row(&mut ops, &row, y, column_width, "F1");
                fresh = false;
                break;
            }
            // Rows that fit on a page move whole; taller ones split at the boundary.
            let fits = ((y - MARGIN - 2.0 * CELL_PADDING) / LINE_HEIGHT).floor().max(0.0) as usize;
            if height > page_room && (fits > 0 || fresh) {
                let rest = split_row(&mut row, fits.max(1));
                draw_row(&mut ops, &row, y, column_width, "F1");
                row = rest;
            }
            pages.push(std::mem::replace(&mut ops, page_start(title)));
            y = draw_row(&mut ops, &header, header_top, column_width, "F2");
            fresh = true;
        }
    }
    pages.push(ops);

    encode_document(pages)
}

fn page_start(title: &str) -> Vec<Operation> {
    text_ops("F2", TITLE_SIZE, MARGIN, PAGE_HEIGHT - 30.0, title)
}

/// Keeps the first `lines` lines of each cell in `row` and returns the rest.
fn split_row(row: &mut [Vec<String>], lines: usize) -> Vec<Vec<String>> {
    row.iter_mut()
        .map(|cell| cell.split_off(lines.min(cell.len())))
        .collect()
}

fn row_height(row: &[Vec<String>]) -> f32 {
    let lines = row.iter().map(Vec::len).max().unwrap_or(1).max(1);
    lines as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

/// Draws one table row with its top edge at `top`; returns the new top.
fn draw_row(ops: &mut Vec<Operation>, row: &[Vec<String>], top: f32, width: f32, font: &str) -> f32 {
    let bottom = top - row_height(row);
    for (c, lines) in row.iter().enumerate() {
        let x = MARGIN + c as f32 * width + CELL_PADDING;
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - CELL_PADDING - (i as f32 + 1.0) * LINE_HEIGHT + 1.0;
            ops.extend(text_ops(font, BODY_SIZE, x, baseline, line));
        }
    }
    ops.push(Operation::new("w", vec![0.2f32.into()]));
    ops.push(Operation::new("m", vec![MARGIN.into(), bottom.into()]));
    ops.push(Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), bottom.into()]));
    ops.push(Operation::new("S", vec![]));
    bottom
}

fn text_ops(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

fn encode_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<ObjectId> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        kids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Greedy word wrap at `max_chars`; words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { word.len() } else { current.chars().count() + 1 + word.len() };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Standard fonts only cover WinAnsi: Latin-1 maps directly, the
/// 0x80-0x9F punctuation block is looked up, the rest becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_extra(c: char) -> Option<u8> {
    let code = match c {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 3), vec![""]);
    }

    #[test]
    fn win_ansi_maps_typography() {
        assert_eq!(win_ansi("a\u{20ac}\u{e9}"), vec![b'a', 0x80, 0xe9]);
        assert_eq!(
            win_ansi("\u{2018}\u{2019}\u{201c}\u{201d}\u{2013}\u{2014}\u{2022}"),
            vec![0x91, 0x92, 0x93, 0x94, 0x96, 0x97, 0x95]
        );
        assert_eq!(win_ansi("\u{4e2d}\u{81}"), vec![b'?', b'?']);
    }

    #[test]
    fn split_row_keeps_leading_lines() {
        let mut row = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["x".to_string()],
        ];
        let rest = split_row(&mut row, 2);
        assert_eq!(row, vec![vec!["a", "b"], vec!["x"]]);
        assert_eq!(rest, vec![vec!["c".to_string()], Vec::new()]);
    }
}
