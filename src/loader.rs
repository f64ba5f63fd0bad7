use crate::error::{Result, ViewerError};
use crate::record::Record;
use calamine::{Data, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use log::{debug, info};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Load report records from a workbook held in memory
///
/// Only the first sheet is read. Its first row supplies the keys; every
/// following row becomes one [`Record`]. Empty cells are left out of the
/// record and rows without any value are skipped.
///
/// # Arguments
/// * `bytes` - Raw XLSX/XLSM/XLSB/XLS/ODS file content
///
/// # Returns
/// * `Result<Vec<Record>>` - Records in sheet order, or the read error
///
/// # Examples
/// ```no_run
/// use crr_viewer::loader::from_workbook_bytes;
///
/// let bytes = std::fs::read("CRR_Full_Combined_Report.xlsx").unwrap();
/// match from_workbook_bytes(bytes) {
///     Ok(records) => println!("Loaded {} articles", records.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn from_workbook_bytes(bytes: Vec<u8>) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    first_sheet_records(&mut workbook)
}

/// Load report records from a workbook on disk
///
/// Same rules as [`from_workbook_bytes`].
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Vec<Record>> {
    let mut workbook = open_workbook_auto(filepath)?;
    first_sheet_records(&mut workbook)
}

fn first_sheet_records<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<Record>> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ViewerError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    debug!("reading sheet {:?} ({}x{})", sheet_name, range.height(), range.width());

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(ViewerError::EmptyWorkbook)?
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();

    let records = rows
        .map(|row| keyed(&headers, row.iter().map(cell_text)))
        .filter(|record| !record.is_empty())
        .collect();
    Ok(records)
}

/// Load report records from CSV text
///
/// The header line supplies the keys, the same way the workbook loader uses
/// the first sheet row.
pub fn from_csv<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(ViewerError::EmptyWorkbook);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = keyed(&headers, row.iter().map(|value| Some(value.to_string())));
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Detect the file type from its name and load it
///
/// CSV files go through [`from_csv`]; everything else is handed to the
/// workbook reader, which sniffs the actual format.
pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Vec<Record>> {
    let records = match extension(file_name).as_deref() {
        Some("csv") => from_csv(bytes.as_slice())?,
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") | None => from_workbook_bytes(bytes)?,
        Some(other) => return Err(ViewerError::UnsupportedFormat(other.to_string())),
    };
    info!("read {} records from {}", records.len(), file_name);
    Ok(records)
}

/// Detect the file type from the extension and load the file
pub fn load_file(filepath: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = filepath.as_ref();
    let name = path.to_string_lossy();
    match extension(&name).as_deref() {
        Some("csv") => from_csv(std::fs::File::open(path)?),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => from_excel(path),
        Some(other) => Err(ViewerError::UnsupportedFormat(other.to_string())),
        None => Err(ViewerError::UnsupportedFormat("file has no extension".to_string())),
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Pairs row values with header keys, dropping blank headers and values.
fn keyed(headers: &[String], values: impl Iterator<Item = Option<String>>) -> Record {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .filter_map(|(header, value)| {
            value
                .filter(|value| !value.is_empty())
                .map(|value| (header.clone(), value))
        })
        .collect()
}

/// Text of a sheet cell, `None` for empty cells.
///
/// Whole numbers lose their fractional part so an article number stored as
/// `92.0` reads as `92`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
