//! Error types
//!
//! Rendering failures are returned to the caller instead of aborting, so the
//! host decides whether a broken template means a 500 or a crash.

use std::path::PathBuf;
use thiserror::Error;

/// Renderer result type
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile template '{}': {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("template context must be a string-keyed map, got {kind}")]
    InvalidContext { kind: &'static str },

    #[error("failed to execute template '{name}': {source}")]
    Execution {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Failure reported by an asset source
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset is stored under the requested path
    #[error("asset not found")]
    NotFound,

    /// The source exists but could not produce the asset
    #[error("asset source failed: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AssetError {
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Other(err.into())
    }

    #[inline]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Other(Box::new(err))
        }
    }
}
