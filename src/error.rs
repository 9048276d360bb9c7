use std::path::PathBuf;
use thiserror::Error;

use crate::models::Side;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data in {path:?}: {reason}")]
    DataFormat { path: PathBuf, reason: String },

    #[error("Snapshot not found: {0:?}")]
    SnapshotNotFound(PathBuf),

    #[error("Snapshot holds no expiry data")]
    EmptySnapshot,

    #[error("Expiry mismatch: expected {expected}, found {found}")]
    ExpiryMismatch { expected: String, found: String },

    #[error("Previous {side} open interest is zero at strike {strike}, percentage change undefined")]
    ZeroOpenInterest { strike: i64, side: Side },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Coarse failure categories, one per row of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Provider,
    Io,
    DataFormat,
    NotFound,
    DivisionByZero,
    UnknownSymbol,
    Config,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Provider(_) | AppError::HttpRequest(_) => ErrorKind::Provider,
            AppError::Io { .. } => ErrorKind::Io,
            AppError::DataFormat { .. }
            | AppError::EmptySnapshot
            | AppError::ExpiryMismatch { .. } => ErrorKind::DataFormat,
            AppError::SnapshotNotFound(_) => ErrorKind::NotFound,
            AppError::ZeroOpenInterest { .. } => ErrorKind::DivisionByZero,
            AppError::UnknownSymbol(_) => ErrorKind::UnknownSymbol,
            AppError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn data_format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::DataFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
