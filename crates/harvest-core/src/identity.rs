//! Identity assignment.
//!
//! Every extracted entity is identified by its natural key
//! `(had_primary_source, identifier_in_primary_source)`. The provider turns
//! that key into an [`Identity`] and always returns the same identity for the
//! same key, within a run and across runs.

use std::collections::HashMap;

use harvest_model::{ExtractedPrimarySource, Identifier, Identity, PrimarySource, Text};
use tracing::debug;

use crate::error::IdentityError;

/// Name of the root primary source; the pipeline itself.
pub const ROOT_PRIMARY_SOURCE: &str = "harvest";

type NaturalKey = (Identifier, String);

/// Assigns identities to natural keys.
pub trait IdentityProvider {
    /// Return the identity for a natural key, creating it on first use.
    fn assign(
        &mut self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
    ) -> Identity;

    /// The identity already assigned to a natural key, if any.
    fn lookup(
        &self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
    ) -> Option<Identity>;
}

/// The identity of the root primary source, which is its own primary source.
pub fn root_identity() -> Identity {
    let stable_target_id = Identifier::from_seed(ROOT_PRIMARY_SOURCE);
    Identity {
        identifier: Identifier::from_seed(&format!("{ROOT_PRIMARY_SOURCE}:identifier")),
        had_primary_source: stable_target_id.clone(),
        identifier_in_primary_source: ROOT_PRIMARY_SOURCE.to_string(),
        stable_target_id,
    }
}

/// Register a harvested system as a primary source of the root.
///
/// Entities extracted from that system use the returned entity's
/// stable target id as their `had_primary_source`.
pub fn extract_primary_source<P>(provider: &mut P, name: &str) -> ExtractedPrimarySource
where
    P: IdentityProvider + ?Sized,
{
    let root = root_identity();
    let identity = provider.assign(&root.stable_target_id, name);
    ExtractedPrimarySource::new(
        identity,
        PrimarySource {
            title: vec![Text::plain(name)],
        },
    )
}

/// Deterministic provider deriving identifiers from the natural key.
///
/// Identifiers are content hashes of the key, so a fresh provider in the next
/// run assigns the same identities. Merges registered with
/// [`HashingIdentityProvider::merge_into`] redirect a key's stable id to an
/// existing entity.
#[derive(Debug, Default)]
pub struct HashingIdentityProvider {
    assigned: HashMap<NaturalKey, Identity>,
    merges: HashMap<NaturalKey, Identifier>,
}

impl HashingIdentityProvider {
    pub fn new() -> Self {
        let mut provider = Self::default();
        let root = root_identity();
        provider.assigned.insert(
            (
                root.had_primary_source.clone(),
                root.identifier_in_primary_source.clone(),
            ),
            root,
        );
        provider
    }

    /// Make a natural key converge on an existing stable id.
    ///
    /// Fails if the key already has an identity with a different stable id;
    /// handing out two stable ids for one entity in a run is not recoverable.
    pub fn merge_into(
        &mut self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
        stable_target_id: Identifier,
    ) -> Result<(), IdentityError> {
        let key = (
            had_primary_source.clone(),
            identifier_in_primary_source.to_string(),
        );
        if let Some(existing) = self.assigned.get(&key)
            && existing.stable_target_id != stable_target_id
        {
            return Err(IdentityError::AlreadyAssigned {
                had_primary_source: had_primary_source.clone(),
                identifier_in_primary_source: identifier_in_primary_source.to_string(),
                existing: existing.stable_target_id.clone(),
            });
        }
        self.merges.insert(key, stable_target_id);
        Ok(())
    }

    /// Number of identities handed out so far, the root included.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl IdentityProvider for HashingIdentityProvider {
    fn assign(
        &mut self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
    ) -> Identity {
        let key = (
            had_primary_source.clone(),
            identifier_in_primary_source.to_string(),
        );
        if let Some(identity) = self.assigned.get(&key) {
            return identity.clone();
        }
        // The source id has a fixed width, so this seed is unambiguous.
        let seed = format!("{had_primary_source}:{identifier_in_primary_source}");
        let stable_target_id = self
            .merges
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Identifier::from_seed(&format!("{seed}:stable")));
        let identity = Identity {
            identifier: Identifier::from_seed(&seed),
            had_primary_source: had_primary_source.clone(),
            identifier_in_primary_source: identifier_in_primary_source.to_string(),
            stable_target_id,
        };
        debug!(
            had_primary_source = %had_primary_source,
            identifier_in_primary_source,
            stable_target_id = %identity.stable_target_id,
            "assigned identity"
        );
        self.assigned.insert(key, identity.clone());
        identity
    }

    fn lookup(
        &self,
        had_primary_source: &Identifier,
        identifier_in_primary_source: &str,
    ) -> Option<Identity> {
        self.assigned
            .get(&(
                had_primary_source.clone(),
                identifier_in_primary_source.to_string(),
            ))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_idempotent_within_and_across_runs() {
        let source = Identifier::from_seed("source");
        let mut first = HashingIdentityProvider::new();
        let a = first.assign(&source, "P-1");
        assert_eq!(first.assign(&source, "P-1"), a);

        let mut second = HashingIdentityProvider::new();
        assert_eq!(second.assign(&source, "P-1"), a);
        assert_ne!(a.identifier, a.stable_target_id);
    }

    #[test]
    fn same_label_in_different_sources_differs() {
        let mut provider = HashingIdentityProvider::new();
        let a = provider.assign(&Identifier::from_seed("a"), "42");
        let b = provider.assign(&Identifier::from_seed("b"), "42");
        assert_ne!(a.stable_target_id, b.stable_target_id);
    }

    #[test]
    fn merged_keys_converge_on_existing_stable_id() {
        let mut provider = HashingIdentityProvider::new();
        let ldap = Identifier::from_seed("ldap");
        let directory = Identifier::from_seed("directory");
        let person = provider.assign(&ldap, "jdoe");

        provider
            .merge_into(&directory, "J. Doe", person.stable_target_id.clone())
            .expect("key not yet assigned");
        let merged = provider.assign(&directory, "J. Doe");
        assert_eq!(merged.stable_target_id, person.stable_target_id);
        assert_ne!(merged.identifier, person.identifier);
    }

    #[test]
    fn merge_after_conflicting_assignment_fails() {
        let mut provider = HashingIdentityProvider::new();
        let source = Identifier::from_seed("source");
        provider.assign(&source, "x");
        let error = provider
            .merge_into(&source, "x", Identifier::from_seed("other"))
            .unwrap_err();
        assert!(matches!(error, IdentityError::AlreadyAssigned { .. }));
    }

    #[test]
    fn root_is_its_own_primary_source() {
        let provider = HashingIdentityProvider::new();
        let root = root_identity();
        assert_eq!(root.had_primary_source, root.stable_target_id);
        assert_eq!(
            provider.lookup(&root.had_primary_source, ROOT_PRIMARY_SOURCE),
            Some(root)
        );
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn primary_sources_hang_off_the_root() {
        let mut provider = HashingIdentityProvider::new();
        let source = extract_primary_source(&mut provider, "project-db");
        assert_eq!(
            source.had_primary_source(),
            &root_identity().stable_target_id
        );
        assert_eq!(source.identifier_in_primary_source(), "project-db");
        assert_eq!(extract_primary_source(&mut provider, "project-db"), source);
    }
}
