//! src/main.rs
//!
//! Entrypoint: parse arguments, set up logging, delegate to `app::run()`.

mod app;
mod graph;
mod net;
mod panels;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reveal-graph")]
#[command(about = "Guess the rest of a line chart, then watch the real data reveal itself", long_about = None)]
pub struct Args {
    /// Flat dataset `x1,y1,x2,y2,...`
    #[arg(long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read the flat dataset from a file
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Logical surface width in pixels
    #[arg(long, default_value_t = 1000.0)]
    pub width: f64,

    /// Logical surface height in pixels
    #[arg(long, default_value_t = 500.0)]
    pub height: f64,

    /// Left margin reserved for the y axis labels
    #[arg(long, default_value_t = 100.0)]
    pub v_base: f64,

    /// Bottom margin reserved for the x axis labels
    #[arg(long, default_value_t = 45.0)]
    pub h_base: f64,

    /// Grid spacing in pixels
    #[arg(long, default_value_t = 10.0)]
    pub spacing: f64,

    /// Data-space x after which the initial series is hidden
    #[arg(long, default_value_t = 2000.5, allow_negative_numbers = true)]
    pub hide_after: f64,

    /// Show the whole series from the start
    #[arg(long)]
    pub no_hide: bool,

    /// Text shown under the graph once it is revealed
    #[arg(long)]
    pub explanation: Option<String>,

    /// Y axis legend
    #[arg(long, default_value = "Y Axis Legend")]
    pub legend: String,

    /// Bind address of the remote control server
    #[arg(long, default_value = "127.0.0.1:4000")]
    pub remote: String,

    /// Do not start the remote control server
    #[arg(long)]
    pub no_remote: bool,

    /// Target frame time in milliseconds
    #[arg(long, default_value_t = 33)]
    pub frame_ms: u64,

    /// Use one scale for both axes
    #[arg(long)]
    pub uniform: bool,

    /// Light colors (dark ink on a white page)
    #[arg(long)]
    pub light: bool,

    /// Enable logging to specified file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Logs go to a file only: the terminal belongs to the UI.
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log else {
        return Ok(());
    };
    let file = File::create(path)
        .wrap_err_with(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .wrap_err("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!("starting reveal-graph");
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(&args)?;
    let res = app::run(args);
    tracing::info!("reveal-graph exited");
    res
}
