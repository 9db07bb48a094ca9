//! Mapping repository over a directory of mapping files.
//!
//! Each mapping lives in `{name}.yaml` (or `.yml`) under the base directory,
//! one file per target entity or field group, for example `activity.yaml`
//! or `resource_disease.yaml`. The repository only reads; mapping files are
//! authored by hand.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use harvest_model::Mapping;
use tracing::debug;

use crate::error::{MappingError, Result};
use crate::loader::load_mapping;
use crate::schema::MappingSchema;

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Metadata about a mapping file found in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingMetadata {
    /// File stem, used as the mapping name.
    pub name: String,
    pub file_path: PathBuf,
}

/// Read-only access to the mapping files of one directory.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

impl MappingRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `name`, if it exists.
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.base_dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_some()
    }

    /// Load the mapping called `name`, coerced against `schema`.
    ///
    /// A missing file is an I/O error naming the expected path.
    pub fn load(&self, name: &str, schema: &MappingSchema) -> Result<Mapping> {
        let path = self.path_of(name).ok_or_else(|| {
            MappingError::io(
                self.base_dir.join(format!("{name}.yaml")),
                std::io::Error::new(std::io::ErrorKind::NotFound, "mapping file not found"),
            )
        })?;
        load_mapping(&path, schema)
    }

    /// Load `name` if present, `None` otherwise.
    pub fn load_optional(&self, name: &str, schema: &MappingSchema) -> Result<Option<Mapping>> {
        match self.path_of(name) {
            Some(path) => load_mapping(&path, schema).map(Some),
            None => Ok(None),
        }
    }

    /// Load every mapping file against an open schema, keyed by name.
    pub fn load_all(&self) -> Result<BTreeMap<String, Mapping>> {
        let mut mappings = BTreeMap::new();
        for entry in self.list()? {
            let schema = MappingSchema::open(entry.name.clone());
            let mapping = load_mapping(&entry.file_path, &schema)?;
            mappings.insert(entry.name, mapping);
        }
        debug!(
            dir = %self.base_dir.display(),
            count = mappings.len(),
            "loaded mapping repository"
        );
        Ok(mappings)
    }

    /// List mapping files, sorted by name.
    pub fn list(&self) -> Result<Vec<MappingMetadata>> {
        let mut metadata = Vec::new();
        let entries =
            fs::read_dir(&self.base_dir).map_err(|source| MappingError::io(&self.base_dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| MappingError::io(&self.base_dir, source))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let has_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if has_extension {
                metadata.push(MappingMetadata {
                    name: name.to_string(),
                    file_path: path.clone(),
                });
            }
        }
        metadata.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metadata)
    }
}
