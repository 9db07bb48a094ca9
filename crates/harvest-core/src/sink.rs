//! Write-only destinations for finished entities.
//!
//! Delivery is at-least-once: a sink may see the same entity twice and must
//! identify it by its natural key rather than duplicate it. Nothing written
//! here is guaranteed to be readable by lookups later in the same run;
//! callers keep their own indexes for that.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use harvest_model::{AnyExtractedEntity, EntityKind, Identifier};
use tracing::debug;

use crate::error::SinkError;

/// Accepts finished entities.
pub trait Sink {
    fn load(&mut self, entities: Vec<AnyExtractedEntity>) -> Result<(), SinkError>;

    fn load_one(&mut self, entity: AnyExtractedEntity) -> Result<(), SinkError> {
        self.load(vec![entity])
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn load(&mut self, entities: Vec<AnyExtractedEntity>) -> Result<(), SinkError> {
        (**self).load(entities)
    }
}

/// In-memory sink keyed by natural key; redelivery replaces the earlier copy.
#[derive(Debug, Default)]
pub struct MemorySink {
    entities: Vec<AnyExtractedEntity>,
    positions: HashMap<(Identifier, String), usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[AnyExtractedEntity] {
        &self.entities
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &AnyExtractedEntity> {
        self.entities
            .iter()
            .filter(move |entity| entity.kind() == kind)
    }

    pub fn get(
        &self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
    ) -> Option<&AnyExtractedEntity> {
        self.positions
            .get(&(
                had_primary_source.clone(),
                identifier_in_primary_source.to_string(),
            ))
            .map(|&position| &self.entities[position])
    }

    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entity in &self.entities {
            *counts.entry(entity.kind()).or_default() += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn into_entities(self) -> Vec<AnyExtractedEntity> {
        self.entities
    }
}

impl Sink for MemorySink {
    fn load(&mut self, entities: Vec<AnyExtractedEntity>) -> Result<(), SinkError> {
        for entity in entities {
            let (source, id) = entity.identity().natural_key();
            let key = (source.clone(), id.to_string());
            match self.positions.get(&key) {
                Some(&position) => self.entities[position] = entity,
                None => {
                    self.positions.insert(key, self.entities.len());
                    self.entities.push(entity);
                }
            }
        }
        Ok(())
    }
}

/// Newline-delimited JSON sink, one entity per line.
///
/// Lines are append-only; consumers deduplicate redelivered entities by
/// `(hadPrimarySource, identifierInPrimarySource)`.
#[derive(Debug)]
pub struct NdjsonSink<W: Write> {
    writer: W,
    path: PathBuf,
    counts: BTreeMap<EntityKind, usize>,
}

impl NdjsonSink<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let io_error = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = File::create(path).map_err(io_error)?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> NdjsonSink<W> {
    /// Wrap a writer; `path` only labels errors.
    pub fn new(writer: W, path: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            path: path.into(),
            counts: BTreeMap::new(),
        }
    }

    /// Entities written so far, per kind.
    pub fn counts(&self) -> &BTreeMap<EntityKind, usize> {
        &self.counts
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> Result<W, SinkError> {
        self.writer.flush().map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "flushed entity sink");
        Ok(self.writer)
    }
}

impl<W: Write> Sink for NdjsonSink<W> {
    fn load(&mut self, entities: Vec<AnyExtractedEntity>) -> Result<(), SinkError> {
        for entity in entities {
            let line =
                serde_json::to_string(&entity).map_err(|source| SinkError::Serialize {
                    identifier: entity.identity().identifier.clone(),
                    source,
                })?;
            writeln!(self.writer, "{line}").map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })?;
            *self.counts.entry(entity.kind()).or_default() += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use harvest_model::{ExtractedOrganization, Identity, Organization, Text};

    use super::*;

    fn organization(label: &str, name: &str) -> AnyExtractedEntity {
        ExtractedOrganization::new(
            Identity {
                identifier: Identifier::from_seed(&format!("{label}:identifier")),
                had_primary_source: Identifier::from_seed("source"),
                identifier_in_primary_source: label.to_string(),
                stable_target_id: Identifier::from_seed(label),
            },
            Organization {
                official_name: vec![Text::plain(name)],
                ..Organization::default()
            },
        )
        .into()
    }

    #[test]
    fn memory_sink_is_idempotent_by_natural_key() {
        let mut sink = MemorySink::new();
        sink.load(vec![organization("acme", "Acme"), organization("rki", "RKI")])
            .expect("load");
        sink.load_one(organization("acme", "Acme Corp")).expect("reload");

        assert_eq!(sink.len(), 2);
        let AnyExtractedEntity::Organization(acme) = sink
            .get(&Identifier::from_seed("source"), "acme")
            .expect("acme is stored")
        else {
            panic!("expected an organization");
        };
        assert_eq!(acme.attributes.official_name, vec![Text::plain("Acme Corp")]);
        assert_eq!(sink.counts()[&EntityKind::Organization], 2);
    }

    #[test]
    fn ndjson_sink_writes_one_line_per_entity() {
        let mut sink = NdjsonSink::new(Vec::new(), "memory");
        sink.load(vec![organization("acme", "Acme"), organization("rki", "RKI")])
            .expect("load");
        assert_eq!(sink.counts()[&EntityKind::Organization], 2);

        let bytes = sink.finish().expect("finish");
        let text = String::from_utf8(bytes).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: AnyExtractedEntity = serde_json::from_str(lines[0]).expect("parse line");
        assert_eq!(first, organization("acme", "Acme"));
    }

    #[test]
    fn ndjson_sink_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out/nested/entities.ndjson");
        let mut sink = NdjsonSink::create(&path).expect("create sink");
        sink.load_one(organization("acme", "Acme")).expect("load");
        sink.finish().expect("finish");
        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\"entityType\":\"ExtractedOrganization\""));
    }
}
