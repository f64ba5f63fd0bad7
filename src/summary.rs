//! Dashboard figures computed over the whole dataset.

use crate::record::{Field, NOT_FOUND, OUT_OF_SCOPE, Record, has_reference, starts_with_ci};
use serde::Serialize;

/// How many files the top-files figure keeps.
pub const TOP_FILES: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupportStatus {
    pub supported: usize,
    pub not_supported: usize,
    pub out_of_scope: usize,
}

impl SupportStatus {
    pub fn total(&self) -> usize {
        self.supported + self.not_supported + self.out_of_scope
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IssueCoverage {
    pub with_issues: usize,
    pub without_issues: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub support: SupportStatus,
    pub top_files: Vec<(String, usize)>,
    pub issues: IssueCoverage,
}

pub fn summarize(records: &[Record]) -> Summary {
    Summary {
        support: support_status(records),
        top_files: top_referenced_files(records, TOP_FILES),
        issues: issue_coverage(records),
    }
}

fn is_out_of_scope(value: &str) -> bool {
    value.eq_ignore_ascii_case(OUT_OF_SCOPE)
}

/// Out of scope wins, then supported (either SAS or TXT has a hit), then
/// not supported.
pub fn support_status(records: &[Record]) -> SupportStatus {
    let mut status = SupportStatus::default();
    for record in records {
        let sas = record.get(Field::ReferencedInSas);
        let txt = record.get(Field::ReferencedInTxt);
        if is_out_of_scope(record.get(Field::OutOfScope))
            || is_out_of_scope(sas)
            || is_out_of_scope(txt)
        {
            status.out_of_scope += 1;
        } else if !starts_with_ci(sas, NOT_FOUND) || !starts_with_ci(txt, NOT_FOUND) {
            status.supported += 1;
        } else {
            status.not_supported += 1;
        }
    }
    status
}

/// Most referenced `.sas` files, by descending count. Ties keep the order in
/// which files were first seen.
pub fn top_referenced_files(records: &[Record], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let references = records
        .iter()
        .map(|record| record.get(Field::ReferencedInSas))
        .filter(|sas| {
            !sas.is_empty() && !starts_with_ci(sas, NOT_FOUND) && !is_out_of_scope(sas)
        });

    for sas in references {
        for entry in sas.split("; ") {
            let name = entry.split(" (").next().unwrap_or(entry);
            if !name.to_lowercase().ends_with(".sas") {
                continue;
            }
            match counts.iter_mut().find(|(seen, _)| seen == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

pub fn issue_coverage(records: &[Record]) -> IssueCoverage {
    let with_issues = records
        .iter()
        .filter(|record| {
            has_reference(record.get(Field::ReferencedInDefects))
                || has_reference(record.get(Field::ReferencedInReqts))
        })
        .count();
    IssueCoverage {
        with_issues,
        without_issues: records.len() - with_issues,
    }
}
