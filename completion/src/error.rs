use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The external command could not be run or exited unsuccessfully.
    ExecutionFailed,
    /// The command succeeded but its output is not a values mapping.
    ParseFailed,
    Cancelled,
    TimedOut,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::ExecutionFailed => "execution failed",
            FetchErrorKind::ParseFailed => "parse failed",
            FetchErrorKind::Cancelled => "cancelled",
            FetchErrorKind::TimedOut => "timed out",
        };
        f.write_str(name)
    }
}

/// Failure to obtain the values tree of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetching values for `{chart_ref}`: {kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub chart_ref: String,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, chart_ref: &str, message: impl Into<String>) -> Self {
        FetchError {
            kind,
            chart_ref: chart_ref.to_string(),
            message: message.into(),
        }
    }

    pub fn execution(chart_ref: &str, message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::ExecutionFailed, chart_ref, message)
    }

    pub fn parse(chart_ref: &str, message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::ParseFailed, chart_ref, message)
    }

    pub fn cancelled(chart_ref: &str) -> Self {
        Self::new(FetchErrorKind::Cancelled, chart_ref, "request was cancelled")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid document pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("provider kind `fixtures` requires `fixtures_dir`")]
    MissingFixturesDir,
}
