//! SSR errors including I/O operations.

use hydrate_ssr_core::SsrCoreError;
use thiserror::Error;

/// SSR errors including I/O operations.
#[derive(Error, Debug)]
pub enum SsrError {
    #[error("Core error: {0}")]
    Core(#[from] SsrCoreError),

    #[error("Failed to load manifest from {path}: {reason}")]
    ManifestLoad { path: String, reason: String },

    #[error("Failed to parse manifest {path}: {reason}")]
    ManifestParse { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SsrError>;

/// Why a route chain stopped before producing a draw target.
///
/// `Redirect` is control flow, not a failure: the resolver turns it into a
/// redirect target and it never escapes resolution.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("No route matches {0}")]
    NotFound(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl RouteError {
    pub fn redirect(target: impl Into<String>) -> Self {
        RouteError::Redirect(target.into())
    }
}

/// Sanitize error messages for client-facing responses.
pub fn sanitize_error(error: &SsrError) -> String {
    match error {
        SsrError::ManifestLoad { .. } | SsrError::ManifestParse { .. } => {
            "Internal configuration error".to_string()
        }
        SsrError::Core(_) => "Render failed".to_string(),
    }
}
