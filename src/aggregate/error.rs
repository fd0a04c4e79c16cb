use crate::retrieval::daily_file::LookupError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Cache lookup failed")]
    CacheLookup(#[from] LookupError),

    #[error("Failed combining daily frames: {0}")]
    FrameProcessing(#[from] PolarsError),

    #[error("I/O error writing aggregated file '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing aggregated file '{0}'")]
    WritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
