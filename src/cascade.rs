//! Cascading hierarchy selectors (Part → Title → Chapter → Section).
//!
//! Each level's options are the distinct non-blank values of its field among
//! the records matching every upstream selection. Changing a level clears and
//! recomputes every level below it.

use crate::error::{Result, ViewerError};
use crate::filter::HIERARCHY;
use crate::record::{Field, Record};
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

pub const LEVELS: usize = HIERARCHY.len();

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Selector {
    pub field: Field,
    pub selected: String,
    /// Sorted, distinct, non-blank.
    pub options: Vec<String>,
    pub enabled: bool,
}

impl Selector {
    fn new(field: Field) -> Self {
        Selector {
            field,
            selected: String::new(),
            options: Vec::new(),
            enabled: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.field.key()
    }

    /// Leading "no selection" entry shown before the options.
    pub fn placeholder(&self) -> String {
        format!("-- Select {} --", self.name())
    }

    fn clear(&mut self) {
        self.selected.clear();
        self.options.clear();
        self.enabled = false;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cascade {
    levels: [Selector; LEVELS],
}

impl Default for Cascade {
    fn default() -> Self {
        Cascade {
            levels: HIERARCHY.map(Selector::new),
        }
    }
}

impl Cascade {
    /// Fresh cascade for a newly loaded dataset: only the first level has
    /// options and is enabled.
    pub fn for_dataset(records: &[Record]) -> Self {
        let mut cascade = Cascade::default();
        cascade.levels[0].options = distinct_values(records, HIERARCHY[0], &[]);
        cascade.levels[0].enabled = true;
        cascade
    }

    pub fn levels(&self) -> &[Selector] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> Option<&Selector> {
        self.levels.get(level)
    }

    /// Selected values, outermost first.
    pub fn selections(&self) -> [&str; LEVELS] {
        [
            self.levels[0].selected.as_str(),
            self.levels[1].selected.as_str(),
            self.levels[2].selected.as_str(),
            self.levels[3].selected.as_str(),
        ]
    }

    /// Sets `level` to `value` (blank clears it) and cascades downstream.
    ///
    /// Rejects disabled levels and values that are not among the level's
    /// options; state is left untouched in that case.
    pub fn select(&mut self, records: &[Record], level: usize, value: &str) -> Result<()> {
        let selector = self
            .levels
            .get(level)
            .ok_or(ViewerError::InvalidLevel(level))?;
        if !selector.enabled {
            return Err(ViewerError::SelectorDisabled {
                selector: selector.name(),
            });
        }
        if !value.is_empty() && !selector.options.iter().any(|option| option == value) {
            return Err(ViewerError::UnknownOption {
                selector: selector.name(),
                value: value.to_string(),
            });
        }

        debug!("{} selector set to {:?}", selector.name(), value);
        self.levels[level].selected = value.to_string();
        for upstream in level..LEVELS - 1 {
            self.cascade_level(records, upstream);
        }
        Ok(())
    }

    /// Clears every selection and recomputes from the top level.
    pub fn reset(&mut self, records: &[Record]) {
        *self = Cascade::for_dataset(records);
    }

    /// Disables and empties every level (no dataset).
    pub fn clear(&mut self) {
        self.levels.iter_mut().for_each(Selector::clear);
    }

    /// Recomputes level `upstream + 1` from the selections of levels
    /// `0..=upstream`.
    fn cascade_level(&mut self, records: &[Record], upstream: usize) {
        let downstream = upstream + 1;
        let active = !self.levels[upstream].selected.is_empty();

        let options = if active {
            let path: Vec<(Field, &str)> = self.levels[..=upstream]
                .iter()
                .map(|selector| (selector.field, selector.selected.as_str()))
                .collect();
            distinct_values(records, HIERARCHY[downstream], &path)
        } else {
            Vec::new()
        };

        let next = &mut self.levels[downstream];
        next.options = options;
        next.selected.clear();
        next.enabled = active;
    }
}

/// Distinct non-blank values of `field` among records whose `path` fields
/// equal the given values, sorted.
fn distinct_values(records: &[Record], field: Field, path: &[(Field, &str)]) -> Vec<String> {
    records
        .iter()
        .filter(|record| path.iter().all(|(f, value)| record.get(*f) == *value))
        .map(|record| record.get(field))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
