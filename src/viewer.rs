//! The viewer controller.
//!
//! [`Viewer`] owns the dataset, the filter controls, the column
//! configuration and the rows currently on display. Every user action is a
//! method call that runs to completion; the web server keeps one `Viewer`
//! behind a mutex and the CLI drives one directly.

use crate::cascade::Cascade;
use crate::columns::{Column, ColumnConfig};
use crate::error::{Result, ViewerError};
use crate::filter::{self, FilterState, TextFilters};
use crate::record::{Record, RowStore};
use crate::render::{self, RenderSettings, Table};
use crate::summary::{self, Summary};
use log::{debug, info};
use serde::Serialize;

/// Buttons that only make sense when rows are on display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub visuals: bool,
    pub export_pdf: bool,
    pub export_xlsx: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub name: &'static str,
    pub placeholder: String,
    pub selected: String,
    pub options: Vec<String>,
    pub enabled: bool,
}

/// Everything a client needs to draw the controls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub loaded: bool,
    /// Filter inputs, filter/reset/column/defects/requirements buttons.
    pub controls_enabled: bool,
    pub selectors: Vec<SelectorView>,
    pub text: TextFilters,
    pub columns: Vec<Column>,
    pub actions: ActionState,
    pub total_rows: usize,
    pub displayed_rows: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Viewer {
    store: RowStore,
    cascade: Cascade,
    text: TextFilters,
    columns: ColumnConfig,
    /// `None` until a filter has been applied to a loaded dataset.
    displayed: Option<Vec<usize>>,
    settings: RenderSettings,
}

impl Viewer {
    pub fn new(settings: RenderSettings) -> Self {
        Viewer {
            settings,
            ..Viewer::default()
        }
    }

    /// Replaces the dataset, resets every filter and shows all rows.
    pub fn load(&mut self, records: Vec<Record>) {
        info!("loaded {} records", records.len());
        self.store.load(records);
        self.text = TextFilters::default();
        self.cascade = Cascade::for_dataset(self.store.records());
        self.displayed = None;
        self.apply();
    }

    /// Back to the pre-upload state: no dataset, controls disabled.
    pub fn unload(&mut self) {
        self.store.unload();
        self.cascade.clear();
        self.text = TextFilters::default();
        self.displayed = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn text_filters(&self) -> &TextFilters {
        &self.text
    }

    pub fn filter_state(&self) -> FilterState {
        let [part, title, chapter, section] = self.cascade.selections();
        FilterState {
            part: part.to_string(),
            title: title.to_string(),
            chapter: chapter.to_string(),
            section: section.to_string(),
            article: self.text.article.clone(),
            sas: self.text.sas.clone(),
            issue: self.text.issue.clone(),
        }
    }

    fn require_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(ViewerError::NoDataset)
        }
    }

    /// Changes a hierarchy selector. Downstream selectors are recomputed;
    /// the displayed rows only change on the next [`Viewer::apply`].
    pub fn select(&mut self, level: usize, value: &str) -> Result<()> {
        self.require_loaded()?;
        self.cascade.select(self.store.records(), level, value)
    }

    /// Updates the free-text filters and re-applies.
    pub fn set_text_filters(&mut self, text: TextFilters) -> Result<()> {
        self.require_loaded()?;
        self.text = text;
        self.apply();
        Ok(())
    }

    /// Filters the dataset with the current controls and displays the
    /// result.
    pub fn apply(&mut self) -> &[usize] {
        let rows = filter::filter(self.store.records(), &self.filter_state());
        self.displayed.insert(rows).as_slice()
    }

    pub fn show_defects_only(&mut self) -> Result<&[usize]> {
        self.require_loaded()?;
        let rows = filter::defects_only(self.store.records(), &self.filter_state());
        Ok(self.displayed.insert(rows).as_slice())
    }

    pub fn show_requirements_only(&mut self) -> Result<&[usize]> {
        self.require_loaded()?;
        let rows = filter::requirements_only(self.store.records(), &self.filter_state());
        Ok(self.displayed.insert(rows).as_slice())
    }

    /// Clears every filter and shows all rows again.
    pub fn reset(&mut self) -> Result<()> {
        self.require_loaded()?;
        debug!("resetting filters");
        self.text = TextFilters::default();
        self.cascade.reset(self.store.records());
        self.apply();
        Ok(())
    }

    /// Shows or hides a column and redraws with the current filters.
    pub fn set_column_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.columns.set_visible(index, visible)?;
        if self.is_loaded() {
            self.apply();
        }
        Ok(())
    }

    pub fn displayed(&self) -> Option<&[usize]> {
        self.displayed.as_deref()
    }

    pub fn has_rows_displayed(&self) -> bool {
        self.displayed.as_ref().is_some_and(|rows| !rows.is_empty())
    }

    pub fn actions(&self) -> ActionState {
        let enabled = self.has_rows_displayed();
        ActionState {
            visuals: enabled,
            export_pdf: enabled,
            export_xlsx: enabled,
        }
    }

    /// The display table for the current state.
    pub fn table(&self) -> Table {
        match &self.displayed {
            Some(rows) if self.is_loaded() => {
                render::render(self.store.records(), rows, &self.columns, &self.settings)
            }
            _ => Table::awaiting_upload(&self.columns),
        }
    }

    /// Dashboard figures over the full dataset.
    pub fn summary(&self) -> Result<Summary> {
        if !self.is_loaded() {
            return Err(ViewerError::NoDataset);
        }
        Ok(summary::summarize(self.store.records()))
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            loaded: self.is_loaded(),
            controls_enabled: self.is_loaded(),
            selectors: self
                .cascade
                .levels()
                .iter()
                .map(|selector| SelectorView {
                    name: selector.name(),
                    placeholder: selector.placeholder(),
                    selected: selector.selected.clone(),
                    options: selector.options.clone(),
                    enabled: selector.enabled,
                })
                .collect(),
            text: self.text.clone(),
            columns: self.columns.all().to_vec(),
            actions: self.actions(),
            total_rows: self.store.len(),
            displayed_rows: self.displayed.as_ref().map(Vec::len),
        }
    }
}
