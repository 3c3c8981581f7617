use std::io;

use thiserror::Error;

use crate::city::City;

/// Failure mapping a single raw trip record onto the canonical shape.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{city} record does not fit column '{column}': {reason}")]
    SchemaMismatch {
        city: City,
        column: String,
        reason: String,
    },
    #[error("{city} start time '{value}' does not match format '{format}'")]
    TimestampParse {
        city: City,
        value: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },
}

/// Error type for normalization runs, aggregate scans and report building.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("normalization aborted at data row {row}: {source}")]
    Normalization {
        row: usize,
        #[source]
        source: SchemaError,
    },
    #[error("{statistic} has no trips in bucket '{bucket}'")]
    DegenerateAggregate {
        statistic: &'static str,
        bucket: String,
    },
    #[error("unknown city '{0}'")]
    UnknownCity(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn degenerate(statistic: &'static str, bucket: impl Into<String>) -> Self {
        AnalysisError::DegenerateAggregate {
            statistic,
            bucket: bucket.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
