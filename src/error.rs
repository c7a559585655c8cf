//! File-scoped error taxonomy.
//!
//! Every variant aborts processing of one input file only; the batch driver
//! reports it and moves on to the next file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// Missing header columns, unparsable timestamps, or a value that has to be
    /// numeric but is not.
    #[error("input format error in {}: {reason}", .path.display())]
    InputFormat { path: PathBuf, reason: String },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Raised only by the `error` aggregation strategy.
    #[error("duplicate values in {}: {name} has {count} rows in generation {key}", .path.display())]
    DuplicateValue {
        path: PathBuf,
        name: String,
        key: String,
        count: usize,
    },

    #[error("cannot render plot for {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub fn input_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FileError::InputFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileError::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

/// A retained row whose timestamp falls inside no generation interval.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("row at timestamp {timestamp} matches no generation")]
pub struct UnassignableRow {
    pub timestamp: f64,
}
