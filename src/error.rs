use std::path::PathBuf;
use thiserror::Error;

use crate::bundle::BundleError;

/// Fatal failures of a library analysis run.
///
/// Everything non-fatal (unknown property shapes, broken `@default` examples)
/// is handled locally and never becomes an `AnalyzeError`.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("package file not found at {path}")]
    PackageNotFound { path: PathBuf },

    #[error("package file {path} is not valid JSON: {source}")]
    InvalidPackage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("typings entry {path} does not exist")]
    MissingEntry { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no components found in library at {root}")]
    NoComponents { root: PathBuf },

    #[error("bundling failed: {0}")]
    Bundle(#[from] BundleError),

    #[error("invalid analyzer options: {0}")]
    Options(#[source] serde_json::Error),

    #[error("analysis aborted: {0}")]
    Internal(String),
}

impl AnalyzeError {
    /// Stable machine-readable code, used by callers to tell incompatible
    /// libraries apart from tool faults.
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::PackageNotFound { .. } => "PA-ERR-PACKAGE-MISSING",
            AnalyzeError::InvalidPackage { .. } => "PA-ERR-PACKAGE-INVALID",
            AnalyzeError::MissingEntry { .. } => "PA-ERR-ENTRY-MISSING",
            AnalyzeError::Io { .. } => "PA-ERR-IO",
            AnalyzeError::NoComponents { .. } => "PA-ERR-NO-COMPONENTS",
            AnalyzeError::Bundle(_) => "PA-ERR-BUNDLE",
            AnalyzeError::Options(_) => "PA-ERR-OPTIONS",
            AnalyzeError::Internal(_) => "PA-ERR-INTERNAL",
        }
    }

    /// Whether the failure points at the analyzed library rather than the tool.
    pub fn is_library_fault(&self) -> bool {
        !matches!(self, AnalyzeError::Internal(_) | AnalyzeError::Options(_))
    }
}
