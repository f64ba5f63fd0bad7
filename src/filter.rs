//! Row filtering over the imported dataset.
//!
//! Hierarchical selectors match exactly; the three free-text filters are
//! case-insensitive substring matches. The issue filter matches when either
//! the defects or the requirements column contains the text.

use crate::record::{Field, Record, has_reference};
use log::debug;
use serde::{Deserialize, Serialize};

/// Hierarchical fields, outermost first.
pub const HIERARCHY: [Field; 4] = [
    Field::PartName,
    Field::TitleName,
    Field::ChapterName,
    Field::SectionName,
];

/// Current value of every filter control. Blank means "not filtering".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub part: String,
    pub title: String,
    pub chapter: String,
    pub section: String,
    pub article: String,
    pub sas: String,
    pub issue: String,
}

/// The three free-text filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFilters {
    pub article: String,
    pub sas: String,
    pub issue: String,
}

impl FilterState {
    /// Selected value of hierarchy level `level` (0 = Part).
    pub fn selection(&self, level: usize) -> &str {
        match level {
            0 => &self.part,
            1 => &self.title,
            2 => &self.chapter,
            3 => &self.section,
            _ => "",
        }
    }

    pub fn is_blank(&self) -> bool {
        *self == FilterState::default()
    }

    /// Compiles the state once so per-row matching does no allocation for
    /// the needles.
    fn compile(&self) -> Predicate<'_> {
        Predicate {
            hierarchy: [
                self.part.as_str(),
                self.title.as_str(),
                self.chapter.as_str(),
                self.section.as_str(),
            ],
            article: self.article.to_lowercase(),
            sas: self.sas.to_lowercase(),
            issue: self.issue.to_lowercase(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.compile().matches(record)
    }
}

struct Predicate<'a> {
    hierarchy: [&'a str; 4],
    article: String,
    sas: String,
    issue: String,
}

impl Predicate<'_> {
    fn matches(&self, record: &Record) -> bool {
        let hierarchy_ok = HIERARCHY
            .iter()
            .zip(self.hierarchy)
            .all(|(field, wanted)| wanted.is_empty() || record.get(*field) == wanted);
        if !hierarchy_ok {
            return false;
        }

        contains_ci(record.get(Field::Article), &self.article)
            && contains_ci(record.get(Field::ReferencedInSas), &self.sas)
            && (contains_ci(record.get(Field::ReferencedInDefects), &self.issue)
                || contains_ci(record.get(Field::ReferencedInReqts), &self.issue))
    }
}

// `needle` is already lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Indices of the records matching `state`, in dataset order.
pub fn filter(records: &[Record], state: &FilterState) -> Vec<usize> {
    let predicate = state.compile();
    let rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| predicate.matches(record))
        .map(|(index, _)| index)
        .collect();
    debug!("filter kept {} of {} rows", rows.len(), records.len());
    rows
}

/// Filtered rows that also carry a real defect reference.
pub fn defects_only(records: &[Record], state: &FilterState) -> Vec<usize> {
    with_reference(records, state, Field::ReferencedInDefects)
}

/// Filtered rows that also carry a real requirement reference.
pub fn requirements_only(records: &[Record], state: &FilterState) -> Vec<usize> {
    with_reference(records, state, Field::ReferencedInReqts)
}

fn with_reference(records: &[Record], state: &FilterState, field: Field) -> Vec<usize> {
    filter(records, state)
        .into_iter()
        .filter(|&index| has_reference(records[index].get(field)))
        .collect()
}
