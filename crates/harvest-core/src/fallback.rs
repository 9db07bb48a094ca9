//! On-the-fly creation of referenced entities that do not exist yet.

use std::collections::HashMap;

use harvest_model::{AnyExtractedEntity, EntityAttributes, Extracted, Identifier};
use tracing::info;

use crate::error::SinkError;
use crate::identity::IdentityProvider;
use crate::sink::Sink;
use crate::xref::{AmbiguityPolicy, CrossReferenceIndex};

/// Label to identifier cache for one transformation pass.
///
/// A label missing from the index gets exactly one synthetic entity per
/// pass, identified by the label itself. The entity goes to the sink at once
/// and its id is added to the index, so later records of the same pass
/// resolve to it without relying on the sink reading back its writes.
#[derive(Debug, Default)]
pub struct FallbackCache {
    created: HashMap<String, Identifier>,
}

impl FallbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `label` through `index`, creating a synthetic entity if absent.
    ///
    /// Existing matches are all used. `build` makes the attributes of the
    /// synthetic entity from the label.
    pub fn resolve_or_create<T, P, S, F>(
        &mut self,
        label: &str,
        index: &mut CrossReferenceIndex,
        provider: &mut P,
        sink: &mut S,
        had_primary_source: &Identifier,
        build: F,
    ) -> Result<Vec<Identifier>, SinkError>
    where
        T: EntityAttributes,
        Extracted<T>: Into<AnyExtractedEntity>,
        P: IdentityProvider + ?Sized,
        S: Sink + ?Sized,
        F: FnOnce(&str) -> T,
    {
        if let Some(id) = self.created.get(label) {
            return Ok(vec![id.clone()]);
        }
        let existing = index.resolve(label, AmbiguityPolicy::UseAll);
        if !existing.is_empty() {
            return Ok(existing);
        }

        let identity = provider.assign(had_primary_source, label);
        let id = identity.stable_target_id.clone();
        let entity = Extracted::new(identity, build(label));
        sink.load_one(entity.into())?;
        let kind = T::KIND;
        info!(
            kind = %kind,
            label,
            stable_target_id = %id,
            "created fallback entity"
        );
        index.insert(label.to_string(), id.clone());
        self.created.insert(label.to_string(), id.clone());
        Ok(vec![id])
    }

    /// Number of synthetic entities created in this pass.
    pub fn created(&self) -> usize {
        self.created.len()
    }
}

#[cfg(test)]
mod tests {
    use harvest_model::{EntityKind, Organization, Text};

    use super::*;
    use crate::identity::HashingIdentityProvider;
    use crate::sink::MemorySink;

    fn organization(label: &str) -> Organization {
        Organization {
            official_name: vec![Text::plain(label)],
            ..Organization::default()
        }
    }

    #[test]
    fn creates_each_label_at_most_once() {
        let mut cache = FallbackCache::new();
        let mut index = CrossReferenceIndex::new();
        let mut provider = HashingIdentityProvider::new();
        let mut sink = MemorySink::new();
        let source = Identifier::from_seed("projects");

        let first = cache
            .resolve_or_create("Acme Corp", &mut index, &mut provider, &mut sink, &source, organization)
            .expect("first");
        let second = cache
            .resolve_or_create("Acme Corp", &mut index, &mut provider, &mut sink, &source, organization)
            .expect("second");

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(cache.created(), 1);
        assert_eq!(sink.of_kind(EntityKind::Organization).count(), 1);
        assert_eq!(index.get("Acme Corp"), first.as_slice());
    }

    #[test]
    fn known_labels_are_not_recreated() {
        let mut cache = FallbackCache::new();
        let mut index = CrossReferenceIndex::new();
        let known = Identifier::from_seed("rki");
        index.insert("RKI".to_string(), known.clone());
        let mut provider = HashingIdentityProvider::new();
        let mut sink = MemorySink::new();

        let ids = cache
            .resolve_or_create(
                "RKI",
                &mut index,
                &mut provider,
                &mut sink,
                &Identifier::from_seed("projects"),
                organization,
            )
            .expect("resolve");
        assert_eq!(ids, vec![known]);
        assert!(sink.is_empty());
        assert_eq!(cache.created(), 0);
    }
}
