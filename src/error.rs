//! Error types for the CRR viewer.

use thiserror::Error;

/// Errors produced by the viewer library.
///
/// None of these are fatal: each one is scoped to the operation that raised
/// it and reported back to the caller (a JSON body in the web server, a
/// message in the CLI).
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Import ===
    /// The workbook could not be opened or its first sheet read.
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// A CSV export could not be parsed.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook has no sheets or the first sheet has no header row.
    #[error("workbook is empty")]
    EmptyWorkbook,

    /// The file extension is not one the loader understands.
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    // === Export ===
    #[error("failed to write XLSX: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to draw chart: {0}")]
    Chart(String),

    #[error("failed to render template: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Export or visuals were requested while no rows are displayed.
    #[error("no rows are displayed")]
    NothingDisplayed,

    // === Viewer state ===
    /// An operation needs a dataset but none is loaded.
    #[error("no dataset loaded")]
    NoDataset,

    #[error("selector level {0} does not exist")]
    InvalidLevel(usize),

    #[error("{selector} selector is disabled")]
    SelectorDisabled { selector: &'static str },

    #[error("'{value}' is not an option of the {selector} selector")]
    UnknownOption {
        selector: &'static str,
        value: String,
    },

    #[error("column {0} does not exist")]
    InvalidColumn(usize),

    // === Environment ===
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The pipeline endpoint could not be reached or answered garbage.
    #[cfg(feature = "web")]
    #[error("pipeline request failed: {0}")]
    Pipeline(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
