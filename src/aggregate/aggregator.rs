use crate::aggregate::error::AggregateError;
use crate::records::builder::DATE_COLUMN;
use crate::retrieval::daily_file::{aggregated_file_name, find_daily_files, select_best};
use crate::types::date_range::DateRange;
use crate::utils::{read_string_csv, write_csv_atomically, WriteFailure};
use chrono::NaiveDate;
use log::{info, warn};
use polars::functions::concat_df_diagonal;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::task;

/// Column of the aggregated file holding the maturity code of each row.
pub const DTYPE_COLUMN: &str = "DTYPE";

/// Outcome of aggregating one region over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionAggregate {
    pub region: String,
    /// `None` when no day of the range had readable data.
    pub path: Option<PathBuf>,
    pub rows: usize,
    /// Days without any cached file. Days whose chosen file could not be read
    /// are listed in `unreadable` instead.
    pub missing_days: Vec<NaiveDate>,
    pub unreadable: Vec<PathBuf>,
}

/// Combines the cached daily files of a range into one file per region.
#[derive(Debug, Clone)]
pub struct RangeAggregator {
    outdir: PathBuf,
}

impl RangeAggregator {
    pub fn new(outdir: &Path) -> Self {
        Self {
            outdir: outdir.to_path_buf(),
        }
    }

    /// Aggregates every region in turn. A failing region does not prevent the
    /// others from being aggregated.
    pub async fn aggregate(
        &self,
        range: &DateRange,
        regions: &[String],
    ) -> Vec<(String, Result<RegionAggregate, AggregateError>)> {
        let mut outcomes = Vec::with_capacity(regions.len());
        for region in regions {
            let outdir = self.outdir.clone();
            let owned_region = region.clone();
            let range = *range;
            let result = task::spawn_blocking(move || {
                aggregate_region(&outdir, &owned_region, &range)
            })
            .await
            .map_err(AggregateError::from)
            .and_then(|r| r);

            if let Err(e) = &result {
                warn!("Aggregation failed for region {}: {}", region, e);
            }
            outcomes.push((region.clone(), result));
        }
        outcomes
    }
}

/// Aggregates one region. Blocking: reads and writes files.
///
/// For each day the most mature cached file wins. Its rows are tagged with the
/// maturity code in [`DTYPE_COLUMN`]; all days are then stacked, absent columns
/// filled with nulls, and written as `eco2mix_{region}_{start}_{end}.csv`.
pub fn aggregate_region(
    outdir: &Path,
    region: &str,
    range: &DateRange,
) -> Result<RegionAggregate, AggregateError> {
    let mut frames = Vec::new();
    let mut missing_days = Vec::new();
    let mut unreadable = Vec::new();

    for day in range.days() {
        let files = find_daily_files(outdir, region, day)?;
        let Some(best) = select_best(&files) else {
            missing_days.push(day);
            continue;
        };

        let tagged = read_string_csv(&best.path).and_then(|frame| {
            frame
                .lazy()
                .with_column(lit(best.maturity.code()).alias(DTYPE_COLUMN))
                .collect()
        });
        match tagged {
            Ok(frame) => frames.push(frame),
            Err(e) => {
                warn!("Skipping unreadable file {:?}: {}", best.path, e);
                unreadable.push(best.path.clone());
            }
        }
    }

    if frames.is_empty() {
        warn!(
            "No data for region {} between {} and {}, nothing aggregated",
            region, range.start, range.end
        );
        return Ok(RegionAggregate {
            region: region.to_string(),
            path: None,
            rows: 0,
            missing_days: range.days().collect(),
            unreadable,
        });
    }

    let combined = concat_df_diagonal(&frames)?;
    let mut combined = combined.select(column_order(&combined))?;

    let path = outdir.join(aggregated_file_name(region, range));
    write_csv_atomically(&mut combined, outdir, &path).map_err(|e| match e {
        WriteFailure::Io(e) => AggregateError::WriteIo(path.clone(), e),
        WriteFailure::Polars(e) => AggregateError::WritePolars(path.clone(), e),
    })?;

    if !missing_days.is_empty() {
        warn!(
            "Region {} is missing {} day(s): {}",
            region,
            missing_days.len(),
            missing_days
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    info!("Aggregated {} rows for region {} into {:?}", combined.height(), region, path);

    Ok(RegionAggregate {
        region: region.to_string(),
        path: Some(path),
        rows: combined.height(),
        missing_days,
        unreadable,
    })
}

/// `date`, `DTYPE`, then the remaining columns in first-seen order.
fn column_order(frame: &DataFrame) -> Vec<String> {
    let names = frame.get_column_names_str();
    let mut order: Vec<String> = [DATE_COLUMN, DTYPE_COLUMN]
        .into_iter()
        .filter(|name| names.contains(name))
        .map(|name| name.to_string())
        .collect();
    order.extend(
        names
            .iter()
            .filter(|name| **name != DATE_COLUMN && **name != DTYPE_COLUMN)
            .map(|name| name.to_string()),
    );
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn strings(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
        frame
            .column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_definitive_wins_over_real_time() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "eco2mix_ARA_DEF_2022-05-01.csv",
            "date;Consommation\n2022-05-01 00:00:00;100\n",
        );
        write(
            dir.path(),
            "eco2mix_ARA_TR_2022-05-02.csv",
            "date;Consommation\n2022-05-02 00:00:00;999\n",
        );
        write(
            dir.path(),
            "eco2mix_ARA_DEF_2022-05-02.csv",
            "date;Consommation;Nucléaire\n2022-05-02 00:00:00;200;50\n",
        );
        write(
            dir.path(),
            "eco2mix_ARA_CONS_2022-05-03.csv",
            "date;Consommation\n2022-05-03 00:00:00;300\n",
        );
        let range = DateRange::new(date(2022, 5, 1), date(2022, 5, 3)).unwrap();

        let aggregate = aggregate_region(dir.path(), "ARA", &range).unwrap();
        let path = dir.path().join("eco2mix_ARA_2022-05-01_2022-05-03.csv");
        assert_eq!(aggregate.path.as_deref(), Some(path.as_path()));
        assert_eq!(aggregate.rows, 3);
        assert!(aggregate.missing_days.is_empty());

        let frame = read_string_csv(&path).unwrap();
        assert_eq!(
            frame.get_column_names_str(),
            vec!["date", "DTYPE", "Consommation", "Nucléaire"]
        );
        assert_eq!(
            strings(&frame, "DTYPE"),
            vec![
                Some("DEF".to_string()),
                Some("DEF".to_string()),
                Some("CONS".to_string())
            ]
        );
        assert_eq!(
            strings(&frame, "Consommation"),
            vec![
                Some("100".to_string()),
                Some("200".to_string()),
                Some("300".to_string())
            ]
        );
        assert_eq!(
            strings(&frame, "Nucléaire"),
            vec![None, Some("50".to_string()), None]
        );
    }

    #[test]
    fn test_missing_day_is_reported() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "eco2mix_FR_TR_2024-03-01.csv",
            "date;Solaire\n2024-03-01 12:00:00;10\n",
        );
        write(
            dir.path(),
            "eco2mix_FR_TR_2024-03-03.csv",
            "date;Solaire\n2024-03-03 12:00:00;30\n",
        );
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 3)).unwrap();

        let aggregate = aggregate_region(dir.path(), "FR", &range).unwrap();
        assert_eq!(aggregate.missing_days, vec![date(2024, 3, 2)]);
        assert_eq!(aggregate.missing_days[0].to_string(), "2024-03-02");
        assert_eq!(aggregate.rows, 2);
    }

    #[test]
    fn test_no_data_writes_nothing() {
        let dir = tempdir().unwrap();
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();
        let aggregate = aggregate_region(dir.path(), "IDF", &range).unwrap();
        assert_eq!(aggregate.path, None);
        assert_eq!(aggregate.rows, 0);
        assert_eq!(aggregate.missing_days, vec![date(2024, 3, 1), date(2024, 3, 2)]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "eco2mix_FR_DEF_2021-01-01.csv",
            "date;Consommation\n2021-01-01 00:00:00;1\n",
        );
        // A directory carrying a daily file name matches the lookup but cannot be read.
        std::fs::create_dir(dir.path().join("eco2mix_FR_DEF_2021-01-02.csv")).unwrap();
        let range = DateRange::new(date(2021, 1, 1), date(2021, 1, 2)).unwrap();

        let aggregate = aggregate_region(dir.path(), "FR", &range).unwrap();
        assert_eq!(aggregate.rows, 1);
        assert_eq!(
            aggregate.unreadable,
            vec![dir.path().join("eco2mix_FR_DEF_2021-01-02.csv")]
        );
        // The day has a file, so it is not missing.
        assert!(aggregate.missing_days.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_runs_every_region() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "eco2mix_BRE_CONS_2023-07-14.csv",
            "date;Eolien\n2023-07-14 00:00:00;5\n",
        );
        let range = DateRange::new(date(2023, 7, 14), date(2023, 7, 14)).unwrap();
        let regions = vec!["BRE".to_string(), "NOR".to_string()];

        let outcomes = RangeAggregator::new(dir.path()).aggregate(&range, &regions).await;
        assert_eq!(outcomes.len(), 2);
        let bre = outcomes[0].1.as_ref().unwrap();
        assert_eq!(bre.rows, 1);
        let nor = outcomes[1].1.as_ref().unwrap();
        assert!(nor.path.is_none());
        assert_eq!(outcomes[1].0, "NOR");
    }
}
