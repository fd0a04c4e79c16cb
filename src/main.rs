mod cli;

use crate::cli::Args;
use clap::Parser;
use eco2mix::{Eco2mix, Eco2mixError, HttpSource};
use log::{error, info, warn};
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args).await {
        Ok(failed) if failed && args.strict => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether any unit of work failed.
async fn run(args: &Args) -> Result<bool, Eco2mixError> {
    let source = HttpSource::builder()
        .maybe_base_url(args.base_url.clone())
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let client = Eco2mix::builder()
        .outdir(args.outdir.clone())
        .source(source)
        .sleep(args.sleep)
        .build();

    let report = client
        .collect_range()
        .start(args.start)
        .end(args.end)
        .regions(&args.regions)
        .force(args.force)
        .aggregate(!args.no_aggregate)
        .call()
        .await?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {:?}", path);
    }

    for failure in report.failures() {
        warn!("{} on {} failed", failure.region, failure.date);
    }
    Ok(report.has_failures())
}
