/*!
# CRR Report Viewer

A browser-based viewer for the consolidated CRR (Capital Requirements
Regulation) coverage report, built in Rust.

## Overview

The report is a spreadsheet with one row per regulation article. Each row
carries the article's place in the regulation hierarchy (part, title,
chapter, section), its text, and cross-references into SAS source files,
text specifications, defect tickets and requirement tickets. The viewer loads
that spreadsheet, narrows it with cascading hierarchy selectors and free-text
filters, and shows the result as a table whose references are links into the
source repository and issue tracker.

## Architecture

### Library
- **Row Store** (`record`) - The loaded dataset, immutable until replaced
- **Column Configuration** (`columns`) - Ordered columns with visibility and rendering kind
- **Filter Engine** (`filter`) - Pure predicate evaluation over the dataset
- **Cascade Controller** (`cascade`) - Hierarchy selectors with dependent options
- **Link Resolver** (`links`) - Local paths and ticket keys to URLs
- **Render Pipeline** (`render`, `html`) - Rows to tagged cells, cells to markup
- **Summary Aggregator** (`summary`) - Support status, top files, issue coverage
- **Viewer Controller** (`viewer`) - The single owner of all of the above

### Edges
- **loader**: XLSX/XLS/ODS/CSV import
- **downloader**: PDF and XLSX export of the displayed rows
- **graph**: SVG charts for the summary figures
- **pipeline**: Triggers and runs the report generation pipeline (feature `web`)
- **app**: axum routes over a shared [`Viewer`] (feature `web`)

## Usage

```no_run
use crr_viewer::{Viewer, loader, render::RenderSettings};

let mut viewer = Viewer::new(RenderSettings::default());
viewer.load(loader::load_file("CRR_Full_Combined_Report.xlsx").unwrap());
viewer.select(0, "PART ONE").unwrap();
let rows = viewer.apply().len();
println!("{} articles in part one", rows);
```

## REST API Endpoints

- `GET /api/state` - Controls and rendered table
- `POST /api/upload` - Replaces the dataset (multipart field `file`)
- `POST /api/selector`, `/api/filters`, `/api/apply`, `/api/reset` - Filtering
- `POST /api/defects-only`, `/api/requirements-only` - Reference views
- `POST /api/columns` - Column visibility
- `GET /api/summary`, `/api/charts/{kind}` - Dashboard
- `GET /api/export/pdf`, `/api/export/xlsx` - Downloads
- `POST /api/refresh` - Pipeline trigger; `POST /run-pipeline` - pipeline runner
*/

pub mod cascade;
pub mod columns;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod graph;
pub mod html;
pub mod links;
pub mod loader;
pub mod record;
pub mod render;
pub mod summary;
pub mod viewer;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod pipeline;

pub use columns::{Column, ColumnConfig, ColumnKind};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use filter::{FilterState, TextFilters};
pub use record::{Field, Record};
pub use render::{CellContent, Table};
pub use summary::Summary;
pub use viewer::Viewer;
