//! Command-line arguments of the `eco2mix` binary.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "eco2mix")]
#[command(about = "Download, cache and aggregate RTE eco2mix regional electricity data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// First day to collect (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day to collect, included (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Region codes, FR for the national perimeter
    #[arg(long, num_args = 1.., required = true)]
    pub regions: Vec<String>,

    /// Directory for daily and aggregated files
    #[arg(long, default_value = "./data")]
    pub outdir: PathBuf,

    /// Seconds to wait after each download attempt
    #[arg(long, default_value = "1.0", value_parser = parse_seconds)]
    pub sleep: Duration,

    /// Download days again even when already cached
    #[arg(long)]
    pub force: bool,

    /// Skip writing the aggregated files
    #[arg(long)]
    pub no_aggregate: bool,

    /// Download endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Write a JSON report of every unit of work to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit with status 1 when any day or region failed
    #[arg(long)]
    pub strict: bool,
}

/// A finite, non-negative number of seconds that fits a `Duration`.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| format!("`{value}` is not a usable pause: {e}"))
}
