use crate::error::{Result, ViewerError};
use crate::summary::{IssueCoverage, Summary, SupportStatus};
use plotters::prelude::*;
use std::f64::consts::PI;

const SUCCESS: RGBColor = RGBColor(40, 167, 69);
const DANGER: RGBColor = RGBColor(220, 53, 69);
const WARNING: RGBColor = RGBColor(255, 193, 7);
const PRIMARY: RGBColor = RGBColor(0, 123, 255);
const EMPTY: RGBColor = RGBColor(222, 226, 230);

/// The three dashboard charts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Doughnut of supported / not supported / out of scope articles
    Support,

    /// Horizontal bars of the most referenced SAS files
    TopFiles,

    /// Doughnut of articles with and without linked issues
    IssueCoverage,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Support, ChartKind::TopFiles, ChartKind::IssueCoverage];

    /// Name used in URLs
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Support => "support",
            ChartKind::TopFiles => "top-files",
            ChartKind::IssueCoverage => "issue-coverage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ChartKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Support => "Article Support Status",
            ChartKind::TopFiles => "Top 5 Referenced SAS Files",
            ChartKind::IssueCoverage => "Issue Coverage",
        }
    }
}

/// Configuration options for chart generation
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 480,
            height: 360,
        }
    }
}

fn chart_error<E: std::error::Error>(err: E) -> ViewerError {
    ViewerError::Chart(err.to_string())
}

/// Draws one dashboard chart as an SVG document
///
/// # Arguments
/// * `kind` - Which chart to draw
/// * `summary` - Figures computed over the full dataset
/// * `options` - Chart dimensions
///
/// # Returns
/// * `Result<String>` - The SVG markup or a drawing error
///
/// # Examples
/// ```no_run
/// use crr_viewer::graph::{ChartKind, ChartOptions, create_chart};
/// use crr_viewer::summary::summarize;
///
/// let summary = summarize(&[]);
/// let svg = create_chart(ChartKind::Support, &summary, &ChartOptions::default()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn create_chart(kind: ChartKind, summary: &Summary, options: &ChartOptions) -> Result<String> {
    match kind {
        ChartKind::Support => support_chart(&summary.support, options),
        ChartKind::TopFiles => top_files_chart(&summary.top_files, options),
        ChartKind::IssueCoverage => issue_coverage_chart(&summary.issues, options),
    }
}

pub fn support_chart(status: &SupportStatus, options: &ChartOptions) -> Result<String> {
    create_doughnut(
        ChartKind::Support.title(),
        &[
            ("Supported", status.supported, SUCCESS),
            ("Not Supported", status.not_supported, DANGER),
            ("Out of Scope", status.out_of_scope, WARNING),
        ],
        options,
    )
}

pub fn issue_coverage_chart(coverage: &IssueCoverage, options: &ChartOptions) -> Result<String> {
    create_doughnut(
        ChartKind::IssueCoverage.title(),
        &[
            ("With Issues", coverage.with_issues, DANGER),
            ("Without Issues", coverage.without_issues, SUCCESS),
        ],
        options,
    )
}

/// Doughnut chart with a legend on the left
///
/// # Implementation Notes
/// * Each slice is a polygon approximating the ring segment, 2 points per degree
/// * An all-zero dataset draws a single grey ring
fn create_doughnut(
    title: &str,
    slices: &[(&str, usize, RGBColor)],
    options: &ChartOptions,
) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        root.draw(&Text::new(title, (10, 10), ("sans-serif", 20).into_font()))
            .map_err(chart_error)?;

        for (i, (label, count, color)) in slices.iter().enumerate() {
            let y = 44 + i as i32 * 22;
            root.draw(&Rectangle::new([(10, y), (24, y + 14)], color.filled()))
                .map_err(chart_error)?;
            root.draw(&Text::new(
                format!("{label} ({count})"),
                (30, y),
                ("sans-serif", 14).into_font(),
            ))
            .map_err(chart_error)?;
        }

        let width = options.width as f64;
        let height = options.height as f64;
        let center = (width * 0.62, height * 0.55);
        let outer = width.min(height) * 0.36;
        let inner = outer * 0.55;

        let total: usize = slices.iter().map(|(_, count, _)| count).sum();
        if total == 0 {
            root.draw(&ring_segment(center, inner, outer, 0.0, 2.0 * PI, EMPTY))
                .map_err(chart_error)?;
        } else {
            let mut start = -PI / 2.0;
            for (_, count, color) in slices.iter().filter(|(_, count, _)| *count > 0) {
                let sweep = *count as f64 / total as f64 * 2.0 * PI;
                root.draw(&ring_segment(center, inner, outer, start, start + sweep, *color))
                    .map_err(chart_error)?;
                start += sweep;
            }
        }

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn ring_segment(
    center: (f64, f64),
    inner: f64,
    outer: f64,
    start: f64,
    end: f64,
    color: RGBColor,
) -> Polygon<(i32, i32)> {
    let steps = (((end - start).to_degrees() * 2.0).ceil() as usize).max(2);
    let point = |radius: f64, angle: f64| {
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };
    let angle = |step: usize| start + (end - start) * step as f64 / steps as f64;

    let mut points: Vec<(i32, i32)> = (0..=steps).map(|s| point(outer, angle(s))).collect();
    points.extend((0..=steps).rev().map(|s| point(inner, angle(s))));
    Polygon::new(points, color.filled())
}

/// Horizontal bar chart of file reference counts, most referenced on top
pub fn top_files_chart(files: &[(String, usize)], options: &ChartOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let rows = files.len().max(1) as i32;
        let max_count = files.iter().map(|(_, count)| *count).max().unwrap_or(0) as i32;

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartKind::TopFiles.title(), ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(140)
            .build_cartesian_2d(0..max_count + 1, 0..rows)
            .map_err(chart_error)?;

        // Bar i occupies [rows - 1 - i, rows - i); its label sits on the lower edge.
        let label = |y: &i32| -> String {
            let index = (rows - 1 - *y) as usize;
            files
                .get(index)
                .map(|(name, _)| name.clone())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows as usize)
            .y_label_formatter(&label)
            .x_desc("Reference Count")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(files.iter().enumerate().map(|(i, (_, count))| {
                let bottom = rows - 1 - i as i32;
                Rectangle::new([(0, bottom), (*count as i32, bottom + 1)], PRIMARY.filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}
