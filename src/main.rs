use clap::Parser;
use crr_viewer::{Viewer, ViewerConfig, app, loader};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crr-viewer",
    version,
    about = "Serve the CRR report viewer in the browser"
)]
struct Args {
    /// JSON configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// URL the Refresh Data button posts to (overrides the config file).
    #[arg(long = "pipeline-endpoint", value_name = "URL")]
    pipeline_endpoint: Option<String>,

    /// Report to load at startup.
    #[arg(long, value_name = "FILE")]
    open: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = ViewerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(endpoint) = args.pipeline_endpoint {
        config.pipeline_endpoint = endpoint;
    }

    let mut viewer = Viewer::new(config.render_settings());
    if let Some(path) = &args.open {
        viewer.load(loader::load_file(path)?);
        info!("preloaded {}", path.display());
    }

    app::run(config, viewer).await
}
