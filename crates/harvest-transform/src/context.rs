//! Per-source transformation context.

use harvest_core::{
    AmbiguityPolicy, CrossReferenceIndex, FallbackCache, IdentityProvider, Lookup, Sink,
};
use harvest_model::{
    AnyExtractedEntity, EntityAttributes, EntityKind, Extracted, ExtractedPrimarySource,
    Identifier, Identity,
};

use crate::error::Result;
use crate::report::TransformReport;

/// Everything a transformer needs besides its records and mappings.
///
/// One context per primary source and pass: the fallback cache and the
/// report live exactly as long as the pass.
pub struct TransformContext<'a> {
    had_primary_source: Identifier,
    provider: &'a mut dyn IdentityProvider,
    sink: &'a mut dyn Sink,
    fallbacks: FallbackCache,
    report: TransformReport,
}

impl<'a> TransformContext<'a> {
    pub fn new(
        primary_source: &ExtractedPrimarySource,
        provider: &'a mut dyn IdentityProvider,
        sink: &'a mut dyn Sink,
    ) -> Self {
        Self {
            had_primary_source: primary_source.stable_target_id().clone(),
            provider,
            sink,
            fallbacks: FallbackCache::new(),
            report: TransformReport::new(),
        }
    }

    pub fn had_primary_source(&self) -> &Identifier {
        &self.had_primary_source
    }

    /// Identity for a record of this source.
    pub fn identity(&mut self, identifier_in_primary_source: &str) -> Identity {
        self.provider
            .assign(&self.had_primary_source, identifier_in_primary_source)
    }

    pub fn extract<T: EntityAttributes>(
        &mut self,
        identifier_in_primary_source: &str,
        attributes: T,
    ) -> Extracted<T> {
        let identity = self.identity(identifier_in_primary_source);
        self.report.produced += 1;
        Extracted::new(identity, attributes)
    }

    /// Resolve a reference, reporting ambiguity against `record`.
    pub fn reference(
        &mut self,
        index: &CrossReferenceIndex,
        key: &str,
        policy: AmbiguityPolicy,
        target: EntityKind,
        record: &str,
        dependency: &str,
    ) -> Vec<Identifier> {
        if let Lookup::Ambiguous(ids) = index.lookup(key) {
            self.report
                .ambiguous(target, record, dependency, ids.len(), policy);
        }
        index.resolve(key, policy)
    }

    /// Resolve `label` through `index`, creating a synthetic entity if needed.
    pub fn reference_or_create<T, F>(
        &mut self,
        index: &mut CrossReferenceIndex,
        label: &str,
        build: F,
    ) -> Result<Vec<Identifier>>
    where
        T: EntityAttributes,
        Extracted<T>: Into<AnyExtractedEntity>,
        F: FnOnce(&str) -> T,
    {
        let before = self.fallbacks.created();
        let ids = self.fallbacks.resolve_or_create(
            label,
            index,
            &mut *self.provider,
            &mut *self.sink,
            &self.had_primary_source,
            build,
        )?;
        self.report.fallbacks += self.fallbacks.created() - before;
        Ok(ids)
    }

    pub fn report_mut(&mut self) -> &mut TransformReport {
        &mut self.report
    }

    pub fn report(&self) -> &TransformReport {
        &self.report
    }

    pub fn into_report(self) -> TransformReport {
        self.report
    }
}
