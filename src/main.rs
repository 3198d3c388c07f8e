mod app;
mod colour;
mod config;
mod export;
mod sunburst;
mod taxa;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Taxonomy JSON: a root node, or an object with a `tree` field.
    #[arg(long)]
    tree: PathBuf,
    /// Metadata overlay keyed by `rank:name`.
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_nodes: Option<usize>,
    /// Zoom to the first taxon matching this text on startup.
    #[arg(long)]
    query: Option<String>,
    /// Write the initial view as an SVG document instead of opening a window.
    #[arg(long)]
    export_svg: Option<PathBuf>,
    /// Taxon id to lay out for the export.
    #[arg(long, requires = "export_svg")]
    layout: Option<String>,
    /// Log filter, e.g. `debug` or `taxon_sunburst=trace`. Defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(max_nodes) = args.max_nodes {
        config.scale.max_nodes = max_nodes;
    }
    if args.query.is_some() {
        config.query_on_startup = args.query.clone();
    }

    if let Some(output) = &args.export_svg {
        return export::export_svg(
            &args.tree,
            args.overlay.as_deref(),
            &config,
            args.layout.as_deref(),
            output,
        );
    }

    let source = app::TaxaSource {
        tree: args.tree,
        overlay: args.overlay,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_title("taxon-sunburst"),
        ..Default::default()
    };

    eframe::run_native(
        "taxon-sunburst",
        options,
        Box::new(move |cc| Ok(Box::new(app::SunburstApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
