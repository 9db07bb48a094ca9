//! Run settings.
//!
//! Settings are a plain value read from TOML and passed explicitly to the
//! steps that need them. Missing keys take defaults; unknown keys are
//! rejected so a misspelled deny-list does not silently filter nothing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::filter::FilterPolicy;

/// Environment variable naming the default settings file.
pub const CONFIG_ENV: &str = "HARVEST_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory of `*.yaml` mapping files.
    pub mapping_dir: PathBuf,
    /// Directory of raw record files.
    pub records_dir: PathBuf,
    /// NDJSON file receiving extracted entities.
    pub output: PathBuf,
    pub filter: FilterPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mapping_dir: PathBuf::from("mappings"),
            records_dir: PathBuf::from("records"),
            output: PathBuf::from("out/entities.ndjson"),
            filter: FilterPolicy::default(),
        }
    }
}

impl Settings {
    /// Parse settings text; `origin` labels errors.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&contents, path)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Resolve relative paths against `base`, typically the settings file's directory.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in [&mut self.mapping_dir, &mut self.records_dir, &mut self.output] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let lists = [
            ("filter.skip_partners", &self.filter.skip_partners),
            ("filter.skip_units", &self.filter.skip_units),
            ("filter.skip_labels", &self.filter.skip_labels),
        ];
        for (key, values) in lists {
            if values.iter().any(|value| value.trim().is_empty()) {
                return Err(ConfigError::invalid(key, "entries must not be blank"));
            }
        }
        Ok(())
    }
}
