use crate::aggregate::aggregator::RegionAggregate;
use crate::aggregate::error::AggregateError;
use crate::error::Eco2mixError;
use crate::retrieval::error::{ErrorKind, RetrievalError};
use crate::retrieval::loader::CacheEntry;
use crate::types::date_range::DateRange;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one (region, date) unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayStatus {
    Cached { path: PathBuf },
    Downloaded { path: PathBuf, rows: usize },
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOutcome {
    pub region: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: DayStatus,
}

impl DayOutcome {
    pub fn new(region: &str, date: NaiveDate, result: Result<CacheEntry, RetrievalError>) -> Self {
        let status = match result {
            Ok(CacheEntry::Cached(path)) => DayStatus::Cached { path },
            Ok(CacheEntry::Downloaded { path, rows }) => DayStatus::Downloaded { path, rows },
            Err(e) => DayStatus::Failed {
                kind: e.kind(),
                message: error_chain(&e),
            },
        };
        Self {
            region: region.to_string(),
            date,
            status,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, DayStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateStatus {
    Written(RegionAggregate),
    Failed { region: String, message: String },
}

/// Everything a `collect_range` run did, unit by unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayOutcome>,
    pub aggregates: Vec<AggregateStatus>,
}

impl BatchReport {
    pub fn new(range: &DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            days: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    pub fn record_aggregate(&mut self, region: String, result: Result<RegionAggregate, AggregateError>) {
        self.aggregates.push(match result {
            Ok(aggregate) => AggregateStatus::Written(aggregate),
            Err(e) => AggregateStatus::Failed {
                region,
                message: error_chain(&e),
            },
        });
    }

    pub fn downloaded(&self) -> usize {
        self.days
            .iter()
            .filter(|d| matches!(d.status, DayStatus::Downloaded { .. }))
            .count()
    }

    pub fn cached(&self) -> usize {
        self.days
            .iter()
            .filter(|d| matches!(d.status, DayStatus::Cached { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DayOutcome> {
        self.days.iter().filter(|d| d.is_failure())
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), Eco2mixError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Eco2mixError::ReportWrite(path.to_path_buf(), e))
    }

    /// True when a unit failed or an aggregation could not be written.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
            || self
                .aggregates
                .iter()
                .any(|a| matches!(a, AggregateStatus::Failed { .. }))
    }
}

/// The error message followed by its sources, `: `-separated.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(e) = source {
        message.push_str(": ");
        message.push_str(&e.to_string());
        source = e.source();
    }
    message
}
