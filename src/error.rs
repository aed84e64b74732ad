use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = WorkdocError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum WorkdocError {
    /// Malformed replacement-table or delimiter input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported document format: {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("i/o failure: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A package part could not be parsed as XML.
    #[error("malformed xml part {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to write package {path}: {reason}")]
    PackageWrite { path: PathBuf, reason: String },

    #[error("json document error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkdocError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn package_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::PackageWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
