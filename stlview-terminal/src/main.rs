//! stlview - render an STL model in the terminal
//!
//! Controls:
//!   - x / y / z: turn the model 90 degrees about that axis
//!   - WASD / Arrow Keys: rotate the view
//!   - E / C: roll the view
//!   - + / -: zoom
//!   - R: reset the view, Space: toggle spin, Tab: cycle draw mode
//!   - Q / ESC: quit

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use stlview_core::{Mesh, StlLoader};
use stlview_terminal::{user_message, TerminalApp, ViewerConfig};
use tracing::{error, info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "stlview", version, about = "Terminal viewer for ASCII and binary STL files")]
struct Cli {
    /// STL file to display
    file: PathBuf,

    /// Where diagnostics are written while the terminal is in use
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Maximum log level (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<Level>,

    /// Target frames per second
    #[arg(long, value_name = "N")]
    fps: Option<u32>,

    /// Keep the model's own coordinates instead of centering and scaling it
    #[arg(long)]
    no_normalize: bool,

    /// Print a summary of the model and exit
    #[arg(long)]
    info: bool,
}

impl Cli {
    fn config(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        ViewerConfig {
            target_fps: self.fps.unwrap_or(defaults.target_fps),
            normalize: !self.no_normalize,
            log_file: self.log_file.clone().unwrap_or(defaults.log_file.clone()),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            ..defaults
        }
    }
}

fn init_logging(config: &ViewerConfig) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("can't create log file {}", config.log_file.display()))?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn print_summary(loader: &StlLoader, mesh: &Mesh) {
    if let Some(format) = loader.file_format() {
        println!("format:    {format}");
    }
    println!("triangles: {}", loader.triangle_count());
    println!("name:      {}", mesh.name());
    if let Some(bbox) = mesh.bounding_box() {
        println!("bounds:    {bbox}");
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config();
    init_logging(&config)?;

    let mut mesh = Mesh::new();
    let mut loader = StlLoader::new();
    if let Err(err) = loader.load_file(&cli.file, &mut mesh) {
        error!(code = err.code(), error = %err, path = %cli.file.display(), "load failed");
        eprintln!("{}", user_message(&err, &cli.file));
        return Ok(ExitCode::from(u8::try_from(err.code()).unwrap_or(1)));
    }
    info!(path = %cli.file.display(), facets = mesh.len(), "model loaded");

    if cli.info {
        print_summary(&loader, &mesh);
        return Ok(ExitCode::SUCCESS);
    }

    if config.normalize {
        mesh.normalize();
    }

    let mut app = TerminalApp::new(mesh, config).context("can't query terminal size")?;
    app.run().context("terminal rendering failed")?;
    Ok(ExitCode::SUCCESS)
}
