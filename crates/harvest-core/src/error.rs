#![deny(unsafe_code)]

use std::path::PathBuf;

use harvest_model::Identifier;

/// Errors from loading run settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Errors from writing entities to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write entities to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {identifier}: {source}")]
    Serialize {
        identifier: Identifier,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    /// A merge was requested for a natural key that already has a different stable id.
    #[error(
        "`{identifier_in_primary_source}` from {had_primary_source} is already assigned to {existing}"
    )]
    AlreadyAssigned {
        had_primary_source: Identifier,
        identifier_in_primary_source: String,
        existing: Identifier,
    },
}
