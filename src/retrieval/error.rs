use crate::parser::error::ParseError;
use crate::retrieval::daily_file::LookupError;
use crate::types::vocabulary::ColumnRole;
use polars::error::PolarsError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse downloaded payload")]
    Parse(#[from] ParseError),

    #[error("Required {role} column not found (columns: {labels:?})")]
    ColumnNotFound { role: ColumnRole, labels: Vec<String> },

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Cache lookup failed")]
    CacheLookup(#[from] LookupError),

    // Errors during CSV writing (inside blocking task)
    #[error("I/O error writing cache file '{0}'")]
    CacheWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing cache file '{0}'")]
    CacheWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Coarse classification of a failed (region, date) unit, as recorded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Parse,
    ColumnNotFound,
    Write,
    Other,
}

impl RetrievalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetrievalError::HttpClient(_)
            | RetrievalError::NetworkRequest(..)
            | RetrievalError::HttpStatus { .. } => ErrorKind::Network,
            RetrievalError::Parse(_) => ErrorKind::Parse,
            RetrievalError::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            RetrievalError::CacheDirCreation(..)
            | RetrievalError::CacheWriteIo(..)
            | RetrievalError::CacheWritePolars(..) => ErrorKind::Write,
            RetrievalError::CacheLookup(..)
            | RetrievalError::DataFrameProcessing(_)
            | RetrievalError::TaskJoin(_) => ErrorKind::Other,
        }
    }
}
