//! The main entry point: collect eco2mix data for a date range and a set of
//! regions into a local directory of daily files, then aggregate them.

use crate::aggregate::aggregator::RangeAggregator;
use crate::error::Eco2mixError;
use crate::records::timestamp::DEFAULT_DAY_FIRST_THRESHOLD;
use crate::report::{BatchReport, DayOutcome};
use crate::retrieval::loader::{CacheEntry, DailyCache};
use crate::retrieval::source::{DataSource, HttpSource};
use crate::types::date_range::DateRange;
use crate::types::vocabulary::Vocabulary;
use bon::bon;
use chrono::{Local, NaiveDate};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Pause after each download attempt when none is configured.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

/// Retrieves, caches and aggregates eco2mix data.
///
/// Requests are made one at a time, with a pause after each download attempt.
/// Days already present in the output directory are not downloaded again,
/// whatever their maturity, unless forced.
///
/// # Examples
///
/// ```rust,no_run
/// # use eco2mix::{Eco2mix, Eco2mixError, HttpSource};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Eco2mixError> {
/// let client = Eco2mix::builder()
///     .outdir("./data".into())
///     .source(HttpSource::builder().build()?)
///     .build();
///
/// let report = client
///     .collect_range()
///     .start(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
///     .end(NaiveDate::from_ymd_opt(2023, 1, 7).unwrap())
///     .regions(&["FR".to_string(), "BRE".to_string()])
///     .call()
///     .await?;
/// println!("{} downloaded, {} cached", report.downloaded(), report.cached());
/// # Ok(())
/// # }
/// ```
pub struct Eco2mix<S: DataSource = HttpSource> {
    cache: DailyCache<S>,
    aggregator: RangeAggregator,
    sleep: Duration,
}

#[bon]
impl<S: DataSource> Eco2mix<S> {
    /// Creates a client writing into `outdir`.
    ///
    /// * `.outdir(PathBuf)`: **Required.** Directory holding daily and aggregated files.
    /// * `.source(S)`: **Required.** Where exports are downloaded from, usually an [`HttpSource`].
    /// * `.sleep(Duration)`: pause after each download attempt. Defaults to one second.
    /// * `.run_date(NaiveDate)`: date used to infer the maturity of unlabelled
    ///   exports. Defaults to today.
    /// * `.vocabulary(Vocabulary)`: column and maturity names. Defaults to the eco2mix ones.
    /// * `.day_first_threshold(f64)`: share of timestamps failing to parse
    ///   month-first above which a file is read day-first. Defaults to `0.5`.
    #[builder]
    pub fn new(
        outdir: PathBuf,
        source: S,
        sleep: Option<Duration>,
        run_date: Option<NaiveDate>,
        vocabulary: Option<Vocabulary>,
        day_first_threshold: Option<f64>,
    ) -> Self {
        let cache = DailyCache::new(
            &outdir,
            source,
            Arc::new(vocabulary.unwrap_or_default()),
            day_first_threshold.unwrap_or(DEFAULT_DAY_FIRST_THRESHOLD),
            run_date.unwrap_or_else(|| Local::now().date_naive()),
        );
        Self {
            cache,
            aggregator: RangeAggregator::new(&outdir),
            sleep: sleep.unwrap_or(DEFAULT_SLEEP),
        }
    }

    pub fn outdir(&self) -> &Path {
        self.cache.outdir()
    }

    /// Makes sure every (region, day) of `[start, end]` is cached, then
    /// aggregates each region over the range.
    ///
    /// * `.start(NaiveDate)`, `.end(NaiveDate)`: **Required.** Inclusive bounds.
    /// * `.regions(&[String])`: **Required.** Region codes, `FR` for the national perimeter.
    /// * `.force(bool)`: download days that are already cached. Defaults to `false`.
    /// * `.aggregate(bool)`: write the per-region aggregated files. Defaults to `true`.
    ///
    /// Failing units are recorded in the returned [`BatchReport`] and the run
    /// goes on with the next one.
    ///
    /// # Errors
    ///
    /// Only [`Eco2mixError::InvalidRange`] when `start` is after `end`.
    #[builder]
    pub async fn collect_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        regions: &[String],
        force: Option<bool>,
        aggregate: Option<bool>,
    ) -> Result<BatchReport, Eco2mixError> {
        let range = DateRange::new(start, end).ok_or(Eco2mixError::InvalidRange { start, end })?;
        let force = force.unwrap_or(false);
        info!(
            "Collecting {} day(s) for {} region(s) into {:?}",
            range.len(),
            regions.len(),
            self.outdir()
        );

        let mut report = BatchReport::new(&range);
        for date in range.days() {
            for region in regions {
                let result = self.cache.ensure_cached(date, region, force).await;
                let attempted_download = !matches!(result, Ok(CacheEntry::Cached(_)));
                if let Err(e) = &result {
                    error!("Failed to retrieve {} on {}: {}", region, date, e);
                }
                report.days.push(DayOutcome::new(region, date, result));
                if attempted_download && !self.sleep.is_zero() {
                    tokio::time::sleep(self.sleep).await;
                }
            }
        }

        if aggregate.unwrap_or(true) {
            for (region, result) in self.aggregator.aggregate(&range, regions).await {
                report.record_aggregate(region, result);
            }
        }

        info!(
            "Done: {} downloaded, {} cached, {} failed",
            report.downloaded(),
            report.cached(),
            report.failures().count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{AggregateStatus, DayStatus};
    use crate::retrieval::error::{ErrorKind, RetrievalError};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Serves a one-row export per day, and fails for region `BAD`.
    #[derive(Default)]
    struct FakeSource {
        requests: Mutex<Vec<(NaiveDate, String)>>,
    }

    impl DataSource for &FakeSource {
        async fn fetch(&self, date: NaiveDate, region: &str) -> Result<Vec<u8>, RetrievalError> {
            self.requests
                .lock()
                .unwrap()
                .push((date, region.to_string()));
            if region == "BAD" {
                return Ok(b"Date;Valeur\n2024-04-03;1\n".to_vec());
            }
            Ok(format!(
                "Nature;Date;Heures;Consommation\nDonnées temps réel;{};00:00;{}\n",
                date.format("%Y-%m-%d"),
                date.format("%d")
            )
            .into_bytes())
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn client<'a>(outdir: &Path, source: &'a FakeSource) -> Eco2mix<&'a FakeSource> {
        Eco2mix::builder()
            .outdir(outdir.to_path_buf())
            .source(source)
            .sleep(Duration::ZERO)
            .run_date(date(30))
            .build()
    }

    #[tokio::test]
    async fn test_collect_range_downloads_then_caches() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let client = client(dir.path(), &source);
        let regions = vec!["FR".to_string(), "IDF".to_string()];

        let report = client
            .collect_range()
            .start(date(1))
            .end(date(2))
            .regions(&regions)
            .call()
            .await
            .unwrap();
        assert_eq!(report.downloaded(), 4);
        assert!(!report.has_failures());
        // Dates outer, regions inner.
        assert_eq!(
            *source.requests.lock().unwrap(),
            vec![
                (date(1), "FR".to_string()),
                (date(1), "IDF".to_string()),
                (date(2), "FR".to_string()),
                (date(2), "IDF".to_string()),
            ]
        );
        assert_eq!(report.aggregates.len(), 2);
        match &report.aggregates[0] {
            AggregateStatus::Written(aggregate) => {
                assert_eq!(aggregate.rows, 2);
                assert_eq!(
                    aggregate.path,
                    Some(dir.path().join("eco2mix_FR_2024-04-01_2024-04-02.csv"))
                );
            }
            other => panic!("unexpected aggregate outcome {:?}", other),
        }

        let again = client
            .collect_range()
            .start(date(1))
            .end(date(2))
            .regions(&regions)
            .aggregate(false)
            .call()
            .await
            .unwrap();
        assert_eq!(again.cached(), 4);
        assert!(again.aggregates.is_empty());
        assert_eq!(source.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failing_region_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let regions = vec!["BAD".to_string(), "ARA".to_string()];

        let report = client(dir.path(), &source)
            .collect_range()
            .start(date(3))
            .end(date(4))
            .regions(&regions)
            .call()
            .await
            .unwrap();
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.downloaded(), 2);
        assert!(matches!(
            report.days[0].status,
            DayStatus::Failed {
                kind: ErrorKind::ColumnNotFound,
                ..
            }
        ));

        match &report.aggregates[0] {
            AggregateStatus::Written(aggregate) => {
                assert_eq!(aggregate.region, "BAD");
                assert!(aggregate.path.is_none());
                assert_eq!(aggregate.missing_days, vec![date(3), date(4)]);
            }
            other => panic!("unexpected aggregate outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let result = client(dir.path(), &source)
            .collect_range()
            .start(date(5))
            .end(date(4))
            .regions(&["FR".to_string()])
            .call()
            .await;
        assert!(matches!(result, Err(Eco2mixError::InvalidRange { .. })));
        assert!(source.requests.lock().unwrap().is_empty());
    }
}
