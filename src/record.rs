use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker written by the report generator when no reference was found.
pub const NOT_FOUND: &str = "not found";

/// Marker written by the report generator for articles outside the scope.
pub const OUT_OF_SCOPE: &str = "out of scope";

/// The named columns of a CRR report export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    PartName,
    TitleName,
    ChapterName,
    SectionName,
    Article,
    ArticleName,
    ArticleContent,
    OutOfScope,
    ReferencedInSas,
    ReferencedInTxt,
    ReferencedInDefects,
    ReferencedInReqts,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::PartName,
        Field::TitleName,
        Field::ChapterName,
        Field::SectionName,
        Field::Article,
        Field::ArticleName,
        Field::ArticleContent,
        Field::OutOfScope,
        Field::ReferencedInSas,
        Field::ReferencedInTxt,
        Field::ReferencedInDefects,
        Field::ReferencedInReqts,
    ];

    /// Header text of the field in the exported sheet.
    pub fn key(self) -> &'static str {
        match self {
            Field::PartName => "Part Name",
            Field::TitleName => "Title Name",
            Field::ChapterName => "Chapter Name",
            Field::SectionName => "Section Name",
            Field::Article => "Article",
            Field::ArticleName => "Article Name",
            Field::ArticleContent => "Article Content",
            Field::OutOfScope => "Out of scope",
            Field::ReferencedInSas => "Referenced_In_SAS",
            Field::ReferencedInTxt => "Referenced_In_TXT",
            Field::ReferencedInDefects => "Referenced_In_Defects",
            Field::ReferencedInReqts => "Referenced_In_Reqts",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// One row of the imported sheet, keyed by header text.
///
/// Missing keys read as blank. Records are never modified after import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by importers and tests.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field.key().to_string(), value.into());
        self
    }

    pub fn get(&self, field: Field) -> &str {
        self.value(field.key())
    }

    /// Value under an arbitrary header, blank when absent.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.get(field).is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Case-insensitive prefix test used by the reference-column rules.
pub fn starts_with_ci(value: &str, prefix: &str) -> bool {
    value.to_lowercase().starts_with(prefix)
}

/// True when a reference field holds an actual reference: non-blank and not
/// one of the generator's "not found" / "out of scope" markers.
pub fn has_reference(value: &str) -> bool {
    !value.is_empty() && !starts_with_ci(value, NOT_FOUND) && !starts_with_ci(value, OUT_OF_SCOPE)
}

/// Holds the imported dataset. `None` until the first successful load.
#[derive(Clone, Debug, Default)]
pub struct RowStore {
    dataset: Option<Vec<Record>>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dataset wholesale.
    pub fn load(&mut self, records: Vec<Record>) {
        self.dataset = Some(records);
    }

    pub fn unload(&mut self) {
        self.dataset = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// All records in import order; empty when nothing is loaded.
    pub fn records(&self) -> &[Record] {
        self.dataset.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
