use crate::parser::parse;
use crate::records::builder::DailyRecordBuilder;
use crate::retrieval::daily_file::{daily_file_name, find_daily_files, select_best};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::source::DataSource;
use crate::types::maturity::Maturity;
use crate::types::vocabulary::Vocabulary;
use crate::utils::{write_csv_atomically, WriteFailure};
use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, task};

/// Result of [`DailyCache::ensure_cached`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// A daily file of some maturity already existed and was kept.
    Cached(PathBuf),
    /// The day was downloaded and written to `path`.
    Downloaded { path: PathBuf, rows: usize },
}

impl CacheEntry {
    pub fn path(&self) -> &Path {
        match self {
            CacheEntry::Cached(path) => path,
            CacheEntry::Downloaded { path, .. } => path,
        }
    }

    pub fn is_download(&self) -> bool {
        matches!(self, CacheEntry::Downloaded { .. })
    }
}

/// On-disk cache of daily files, one per (region, maturity, date).
pub struct DailyCache<S> {
    outdir: PathBuf,
    source: S,
    vocabulary: Arc<Vocabulary>,
    day_first_threshold: f64,
    run_date: NaiveDate,
}

impl<S: DataSource> DailyCache<S> {
    pub fn new(
        outdir: &Path,
        source: S,
        vocabulary: Arc<Vocabulary>,
        day_first_threshold: f64,
        run_date: NaiveDate,
    ) -> Self {
        Self {
            outdir: outdir.to_path_buf(),
            source,
            vocabulary,
            day_first_threshold,
            run_date,
        }
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Makes sure a daily file exists for `region` on `date`.
    ///
    /// Any existing daily file counts as a hit, whatever its maturity, unless
    /// `force` is set. Otherwise the export is downloaded, normalized and written
    /// under the name of its maturity; existing files are never removed, so a
    /// forced refresh may leave several maturities side by side.
    pub async fn ensure_cached(
        &self,
        date: NaiveDate,
        region: &str,
        force: bool,
    ) -> Result<CacheEntry, RetrievalError> {
        fs::create_dir_all(&self.outdir)
            .await
            .map_err(|e| RetrievalError::CacheDirCreation(self.outdir.clone(), e))?;

        if !force {
            let existing = find_daily_files(&self.outdir, region, date)?;
            if let Some(file) = select_best(&existing) {
                info!("Cache hit for {} on {} at {:?}", region, date, file.path);
                return Ok(CacheEntry::Cached(file.path.clone()));
            }
        }

        let bytes = self.source.fetch(date, region).await?;

        let vocabulary = Arc::clone(&self.vocabulary);
        let threshold = self.day_first_threshold;
        let records = task::spawn_blocking(move || {
            let table = parse(&bytes)?;
            debug!(
                "Parsed {} rows x {} columns",
                table.height(),
                table.width()
            );
            DailyRecordBuilder::new(&vocabulary, threshold).build(table)
        })
        .await??;

        let maturity = match records.observed_maturity() {
            Some(maturity) => maturity,
            None => {
                let expected = Maturity::expected_for(date, self.run_date);
                debug!(
                    "No maturity in the data for {} on {}, assuming {}",
                    region, date, expected
                );
                expected
            }
        };

        let path = self
            .outdir
            .join(daily_file_name(region, maturity, date));
        let rows = records.frame.height();
        write_daily_file(records.frame, &self.outdir, &path).await?;
        info!("Saved {} rows to {:?}", rows, path);
        Ok(CacheEntry::Downloaded { path, rows })
    }
}

async fn write_daily_file(
    mut frame: DataFrame,
    dir: &Path,
    path: &Path,
) -> Result<(), RetrievalError> {
    let dir = dir.to_path_buf();
    let path = path.to_path_buf();
    task::spawn_blocking(move || {
        write_csv_atomically(&mut frame, &dir, &path).map_err(|e| match e {
            WriteFailure::Io(e) => RetrievalError::CacheWriteIo(path.clone(), e),
            WriteFailure::Polars(e) => RetrievalError::CacheWritePolars(path.clone(), e),
        })
    })
    .await?
}
