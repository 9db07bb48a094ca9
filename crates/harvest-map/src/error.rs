//! Error types for mapping operations.

use std::path::PathBuf;

/// Errors from loading or coercing a mapping file.
///
/// Every variant names the offending file so a failed step can be traced
/// back to the mapping that broke it.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("failed to read mapping {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed YAML.
    #[error("failed to parse mapping {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file is well-formed but does not fit the mapping model.
    #[error("invalid mapping {path}: {message}")]
    Schema { path: PathBuf, message: String },
}

impl MappingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Schema { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
