use clap::Parser;
use crr_viewer::filter::HIERARCHY;
use crr_viewer::{TextFilters, Viewer, ViewerConfig, downloader, html, loader, summary};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crr-report",
    version,
    about = "Filter a CRR coverage report and export the result",
    long_about = "Load a CRR coverage workbook, narrow it with the same filters as the \
                  browser viewer, print the dashboard figures and optionally write the \
                  filtered rows as PDF, XLSX or HTML."
)]
struct Args {
    /// Workbook (XLSX, XLS, ODS) or CSV export of the report.
    #[arg(value_name = "REPORT")]
    report: PathBuf,

    /// JSON configuration file (link settings).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long)]
    part: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    chapter: Option<String>,

    #[arg(long)]
    section: Option<String>,

    /// Case-insensitive substring of the article number.
    #[arg(long, default_value = "")]
    article: String,

    /// Case-insensitive substring of the SAS references.
    #[arg(long, default_value = "")]
    sas: String,

    /// Case-insensitive substring of the defect or requirement references.
    #[arg(long, default_value = "")]
    issue: String,

    /// Keep only rows that reference a defect.
    #[arg(long = "defects-only", conflicts_with = "requirements_only")]
    defects_only: bool,

    /// Keep only rows that reference a requirement.
    #[arg(long = "requirements-only")]
    requirements_only: bool,

    /// Also show the Out of Scope column.
    #[arg(long = "show-out-of-scope")]
    show_out_of_scope: bool,

    #[arg(long, value_name = "FILE")]
    pdf: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    xlsx: Option<PathBuf>,

    /// Write the rendered table markup.
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ViewerConfig::load(args.config.as_deref())?;
    let mut viewer = Viewer::new(config.render_settings());
    viewer.load(loader::load_file(&args.report)?);

    if args.show_out_of_scope {
        let index = viewer
            .columns()
            .all()
            .iter()
            .position(|column| column.field == crr_viewer::Field::OutOfScope);
        if let Some(index) = index {
            viewer.set_column_visible(index, true)?;
        }
    }

    let selections = [&args.part, &args.title, &args.chapter, &args.section];
    for (level, value) in selections.into_iter().enumerate() {
        if let Some(value) = value {
            info!("{} = {:?}", HIERARCHY[level].key(), value);
            viewer.select(level, value)?;
        }
    }
    viewer.set_text_filters(TextFilters {
        article: args.article,
        sas: args.sas,
        issue: args.issue,
    })?;

    let displayed = if args.defects_only {
        viewer.show_defects_only()?.len()
    } else if args.requirements_only {
        viewer.show_requirements_only()?.len()
    } else {
        viewer.apply().len()
    };

    print_summary(&viewer.summary()?, viewer.records().len(), displayed);

    let table = viewer.table();
    if let Some(path) = &args.pdf {
        std::fs::write(path, downloader::to_pdf(&table)?)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.xlsx {
        std::fs::write(path, downloader::to_xlsx(viewer.records(), &table, viewer.columns())?)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.html {
        std::fs::write(path, html::table_html(&table)?)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &summary::Summary, total: usize, displayed: usize) {
    println!("Articles: {} loaded, {} displayed", total, displayed);
    println!();
    println!("Support status");
    println!("  Supported:      {:>6}", summary.support.supported);
    println!("  Not Supported:  {:>6}", summary.support.not_supported);
    println!("  Out of Scope:   {:>6}", summary.support.out_of_scope);
    println!();
    println!("Top referenced SAS files");
    if summary.top_files.is_empty() {
        println!("  (none)");
    }
    for (name, count) in &summary.top_files {
        println!("  {:<40} {:>6}", name, count);
    }
    println!();
    println!("Issue coverage");
    println!("  With Issues:    {:>6}", summary.issues.with_issues);
    println!("  Without Issues: {:>6}", summary.issues.without_issues);
}
