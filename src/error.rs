use crate::aggregate::error::AggregateError;
use crate::retrieval::error::RetrievalError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Eco2mixError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to write batch report '{0}'")]
    ReportWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode batch report")]
    ReportEncode(#[from] serde_json::Error),
}
