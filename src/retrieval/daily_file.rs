//! Naming and lookup of the per-day cache files.
//!
//! The maturity of a daily file lives in its name
//! (`eco2mix_{region}_{maturity}_{date}.csv`), so finding the files of a day is a
//! glob on region and date, and choosing between them needs no file content.

use crate::types::date_range::DateRange;
use crate::types::maturity::Maturity;
use chrono::NaiveDate;
use glob::{glob, Pattern, PatternError};
use log::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub fn daily_file_name(region: &str, maturity: Maturity, date: NaiveDate) -> String {
    format!(
        "eco2mix_{}_{}_{}.csv",
        region,
        maturity.code(),
        date.format("%Y-%m-%d")
    )
}

pub fn aggregated_file_name(region: &str, range: &DateRange) -> String {
    format!("eco2mix_{}_{}.csv", region, range)
}

#[derive(Debug, Error)]
#[error("Invalid cache lookup pattern '{pattern}'")]
pub struct LookupError {
    pub pattern: String,
    #[source]
    pub source: PatternError,
}

/// A daily cache file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyFile {
    pub path: PathBuf,
    pub maturity: Maturity,
}

/// All daily files of `region` for `date`, whatever their maturity, in glob
/// (alphabetical) order. Files matching the pattern without a valid maturity
/// segment, such as aggregated files ending on the same date, are ignored.
pub fn find_daily_files(
    outdir: &Path,
    region: &str,
    date: NaiveDate,
) -> Result<Vec<DailyFile>, LookupError> {
    let pattern = format!(
        "{}/eco2mix_{}_*_{}.csv",
        Pattern::escape(&outdir.to_string_lossy()),
        Pattern::escape(region),
        date.format("%Y-%m-%d")
    );
    let paths = match glob(&pattern) {
        Ok(paths) => paths,
        Err(source) => return Err(LookupError { pattern, source }),
    };

    let mut files = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable cache entry: {}", e);
                continue;
            }
        };
        let maturity = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|name| name.starts_with(&format!("eco2mix_{}_", region)))
            .and_then(Maturity::from_file_name);
        if let Some(maturity) = maturity {
            files.push(DailyFile { path, maturity });
        }
    }
    Ok(files)
}

/// The most mature of several daily files: DEF over CONS over TR, first one on ties.
pub fn select_best(files: &[DailyFile]) -> Option<&DailyFile> {
    let best = files.iter().fold(None::<&DailyFile>, |best, file| match best {
        Some(b) if b.maturity.priority() >= file.maturity.priority() => Some(b),
        _ => Some(file),
    })?;
    let ties = files.iter().filter(|f| f.maturity == best.maturity).count();
    if ties > 1 {
        warn!(
            "{} cached files share maturity {}; using {}",
            ties,
            best.maturity,
            best.path.display()
        );
    }
    Some(best)
}
