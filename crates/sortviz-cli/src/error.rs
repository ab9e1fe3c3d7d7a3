#![forbid(unsafe_code)]

use std::path::PathBuf;

use sortviz_algos::AlgoError;
use sortviz_core::TraceError;
use sortviz_runtime::ConfigError;
use thiserror::Error;

pub const EXIT_USAGE: i32 = 2;
pub const EXIT_DATA: i32 = 65;
pub const EXIT_IO: i32 = 74;
pub const EXIT_CONFIG: i32 = 78;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Algo(#[from] AlgoError),

    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code, following the sysexits convention.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Algo(_) | Self::InvalidArgument { .. } => EXIT_USAGE,
            Self::Trace(_) | Self::Json(_) => EXIT_DATA,
            Self::Io { .. } | Self::Output(_) => EXIT_IO,
            Self::Config(_) => EXIT_CONFIG,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err)
    }
}
