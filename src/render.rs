//! Projection of filtered rows into display cells.
//!
//! Every visible column is rendered according to its [`ColumnKind`]. The
//! result is a plain data structure; `html` turns it into markup and the
//! exporters read its plain-text form.

use crate::columns::{ColumnConfig, ColumnKind};
use crate::links::{LinkConfig, basename};
use crate::record::{NOT_FOUND, Record, starts_with_ci};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TICKET_KEY: Regex = Regex::new(r"[A-Z]+-[0-9]+").unwrap();
}

/// Separator between entries of a reference field.
pub const ENTRY_SEPARATOR: &str = "; ";
/// Separator between line numbers inside one entry.
pub const LINE_SEPARATOR: &str = ", ";
/// Separator between per-line annotations of a TXT entry.
pub const NOTE_SEPARATOR: &str = "[NL]";

pub const EMPTY_NOTICE: &str = "No data to display.";
pub const UPLOAD_NOTICE: &str = "Please upload the 'CRR_Full_Combined_Report.xlsx' file.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub links: LinkConfig,
    /// Long text longer than this many characters starts collapsed.
    pub collapse_after: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            links: LinkConfig::default(),
            collapse_after: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    Text { text: String },
    LongText { lines: Vec<String>, collapsible: bool },
    Issues { items: Vec<IssueItem> },
    SourceRefs { items: Vec<SourceItem> },
}

/// One entry of a defects/requirements field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueItem {
    pub before: String,
    pub ticket: Option<Ticket>,
    pub after: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub key: String,
    pub url: String,
}

/// One entry of a SAS or TXT reference field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SourceItem {
    /// Entry with the wrong number of `|` parts, shown verbatim.
    Unparsed { text: String },
    File {
        name: String,
        /// "section, subsection" for TXT entries.
        location: Option<String>,
        lines: Vec<LineRef>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineRef {
    pub line: String,
    /// `None` when the file path does not translate to a repository link.
    pub url: Option<String>,
    pub annotated: bool,
    pub note: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellContent>>,
    /// Message shown instead of rows.
    pub notice: Option<String>,
}

impl Table {
    /// Table shown before any dataset is loaded.
    pub fn awaiting_upload(columns: &ColumnConfig) -> Self {
        Table {
            headers: columns.visible().map(|column| column.label.clone()).collect(),
            rows: Vec::new(),
            notice: Some(UPLOAD_NOTICE.to_string()),
        }
    }

    /// Columns the notice row has to span.
    pub fn span(&self) -> usize {
        self.headers.len().max(1)
    }

    /// Rows as whitespace-collapsed plain text, for exports.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| collapse_whitespace(&cell.plain_text())).collect())
            .collect()
    }
}

/// Renders `rows` (indices into `records`) through the visible columns.
pub fn render(
    records: &[Record],
    rows: &[usize],
    columns: &ColumnConfig,
    settings: &RenderSettings,
) -> Table {
    let headers = columns.visible().map(|column| column.label.clone()).collect();
    let body: Vec<Vec<CellContent>> = rows
        .iter()
        .filter_map(|&index| records.get(index))
        .map(|record| {
            columns
                .visible()
                .map(|column| render_cell(column.kind, record.get(column.field), settings))
                .collect()
        })
        .collect();

    let notice = body.is_empty().then(|| EMPTY_NOTICE.to_string());
    Table {
        headers,
        rows: body,
        notice,
    }
}

pub fn render_cell(kind: ColumnKind, value: &str, settings: &RenderSettings) -> CellContent {
    match kind {
        ColumnKind::Plain => text(value),
        ColumnKind::LongText => CellContent::LongText {
            lines: value
                .split('\n')
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
            collapsible: value.chars().count() > settings.collapse_after,
        },
        ColumnKind::IssueReference if is_reference_list(value) => CellContent::Issues {
            items: value
                .split(ENTRY_SEPARATOR)
                .map(|entry| issue_item(entry, &settings.links))
                .collect(),
        },
        ColumnKind::SasReference if is_reference_list(value) => CellContent::SourceRefs {
            items: value
                .split(ENTRY_SEPARATOR)
                .map(|entry| sas_item(entry, &settings.links))
                .collect(),
        },
        ColumnKind::TxtReference if is_reference_list(value) => CellContent::SourceRefs {
            items: value
                .split(ENTRY_SEPARATOR)
                .map(|entry| txt_item(entry, &settings.links))
                .collect(),
        },
        ColumnKind::IssueReference | ColumnKind::SasReference | ColumnKind::TxtReference => {
            text(value)
        }
    }
}

fn text(value: &str) -> CellContent {
    CellContent::Text {
        text: value.to_string(),
    }
}

fn is_reference_list(value: &str) -> bool {
    !value.is_empty() && !starts_with_ci(value, NOT_FOUND)
}

pub fn issue_item(entry: &str, links: &LinkConfig) -> IssueItem {
    match TICKET_KEY.find(entry) {
        Some(found) => IssueItem {
            before: entry[..found.start()].to_string(),
            ticket: Some(Ticket {
                key: found.as_str().to_string(),
                url: links.ticket_link(found.as_str()),
            }),
            after: entry[found.end()..].to_string(),
        },
        None => IssueItem {
            before: entry.to_string(),
            ticket: None,
            after: String::new(),
        },
    }
}

/// `path|10, 20`
pub fn sas_item(entry: &str, links: &LinkConfig) -> SourceItem {
    let parts: Vec<&str> = entry.split('|').collect();
    let [path, lines] = parts.as_slice() else {
        return SourceItem::Unparsed {
            text: entry.to_string(),
        };
    };

    SourceItem::File {
        name: basename(path).to_string(),
        location: None,
        lines: lines
            .split(LINE_SEPARATOR)
            .map(|line| LineRef {
                line: line.to_string(),
                url: links.source_link(path, line),
                annotated: false,
                note: String::new(),
            })
            .collect(),
    }
}

/// `path|section|subsection|10, 20|note one[NL]note two`
///
/// Annotations may themselves contain `|`; everything after the fourth part
/// is one annotation string.
pub fn txt_item(entry: &str, links: &LinkConfig) -> SourceItem {
    let parts: Vec<&str> = entry.split('|').collect();
    if parts.len() < 5 {
        return SourceItem::Unparsed {
            text: entry.to_string(),
        };
    }

    let path = parts[0];
    let notes_joined = parts[4..].join("|");
    let notes: Vec<&str> = notes_joined.split(NOTE_SEPARATOR).collect();

    SourceItem::File {
        name: basename(path).to_string(),
        location: Some(format!("{}, {}", parts[1], parts[2])),
        lines: parts[3]
            .split(LINE_SEPARATOR)
            .enumerate()
            .map(|(i, line)| LineRef {
                line: line.to_string(),
                url: links.source_link(path, line),
                annotated: true,
                note: notes.get(i).map(|note| note.trim()).unwrap_or("").to_string(),
            })
            .collect(),
    }
}

impl CellContent {
    /// Text a reader sees in the cell, one list item per line.
    pub fn plain_text(&self) -> String {
        match self {
            CellContent::Text { text } => text.clone(),
            CellContent::LongText { lines, .. } => lines.join("\n"),
            CellContent::Issues { items } => items
                .iter()
                .map(|item| match &item.ticket {
                    Some(ticket) => format!("{}{}{}", item.before, ticket.key, item.after),
                    None => item.before.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            CellContent::SourceRefs { items } => items
                .iter()
                .map(SourceItem::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl SourceItem {
    pub fn plain_text(&self) -> String {
        match self {
            SourceItem::Unparsed { text } => text.clone(),
            SourceItem::File {
                name,
                location,
                lines,
            } => {
                let lines = lines
                    .iter()
                    .map(|line| line.line.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                match location {
                    Some(location) => format!("{name} ({location}) ({lines})"),
                    None => format!("{name} ({lines})"),
                }
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_entry_splits_around_first_key() {
        let item = issue_item("Bug RRMCR-77 (open) see RRMCR-78", &LinkConfig::default());
        assert_eq!(item.before, "Bug ");
        assert_eq!(item.ticket.as_ref().map(|t| t.key.as_str()), Some("RRMCR-77"));
        assert_eq!(item.after, " (open) see RRMCR-78");
    }

    #[test]
    fn lowercase_key_is_not_a_ticket() {
        let item = issue_item("crr-12 mention", &LinkConfig::default());
        assert!(item.ticket.is_none());
        assert_eq!(item.before, "crr-12 mention");
    }

    #[test]
    fn txt_annotations_align_with_lines() {
        let item = txt_item(
            r"C:\Users\sinjav\Documents\p\doc.txt|Intro|Scope|3, 9|first | piped[NL] second",
            &LinkConfig::default(),
        );
        let SourceItem::File { lines, location, .. } = item else {
            panic!("expected a parsed entry");
        };
        assert_eq!(location.as_deref(), Some("Intro, Scope"));
        assert_eq!(lines[0].note, "first | piped");
        assert_eq!(lines[1].note, "second");
    }

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  a \n\n b\tc "), "a b c");
    }
}
