//! Cross-reference indexes from natural keys to stable identifiers.
//!
//! An index maps every declared key of an entity (an email address, a unit
//! synonym, an organization label) to the stable ids of all entities
//! declaring it. Keys are never overwritten: a shared key accumulates every
//! owner in processing order, and lookups decide per call site what to do
//! with zero or several matches.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use harvest_model::{EntityAttributes, Extracted, Identifier};
use tracing::warn;

/// How a call site treats a key that matches more than one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Reference every match, e.g. all persons sharing a display name.
    UseAll,
    /// Reference only the lexicographically smallest identifier.
    FirstLexicographic,
}

impl AmbiguityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguityPolicy::UseAll => "use-all",
            AmbiguityPolicy::FirstLexicographic => "first-lexicographic",
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of looking up one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Missing,
    Unique(&'a Identifier),
    Ambiguous(&'a [Identifier]),
}

/// Run-scoped index from natural key to stable identifiers.
#[derive(Debug, Clone)]
pub struct CrossReferenceIndex<K = String> {
    entries: HashMap<K, Vec<Identifier>>,
}

impl<K> Default for CrossReferenceIndex<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> CrossReferenceIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` refers to `id`.
    ///
    /// Appends after earlier owners of the key; an id already listed under
    /// the key is not repeated.
    pub fn insert(&mut self, key: K, id: Identifier) {
        let ids = self.entries.entry(key).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Add every key of every entity, in iteration order.
    pub fn extend<'a, T, I, F, Ks>(&mut self, entities: I, mut key_extractor: F)
    where
        T: EntityAttributes + 'a,
        I: IntoIterator<Item = &'a Extracted<T>>,
        F: FnMut(&Extracted<T>) -> Ks,
        Ks: IntoIterator<Item = K>,
    {
        for entity in entities {
            for key in key_extractor(entity) {
                self.insert(key, entity.stable_target_id().clone());
            }
        }
    }

    /// All identifiers under `key`, in the order they were indexed.
    pub fn get<Q>(&self, key: &Q) -> &[Identifier]
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn lookup<Q>(&self, key: &Q) -> Lookup<'_>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.get(key) {
            [] => Lookup::Missing,
            [only] => Lookup::Unique(only),
            many => Lookup::Ambiguous(many),
        }
    }

    /// Resolve `key` under an explicit ambiguity policy.
    ///
    /// Zero matches give an empty list; the caller decides whether that
    /// skips the record or triggers a fallback. Several matches are logged
    /// at warn level before the policy is applied.
    pub fn resolve<Q>(&self, key: &Q, policy: AmbiguityPolicy) -> Vec<Identifier>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Debug + ?Sized,
    {
        match self.lookup(key) {
            Lookup::Missing => Vec::new(),
            Lookup::Unique(id) => vec![id.clone()],
            Lookup::Ambiguous(ids) => {
                warn!(
                    key = ?key,
                    matches = ids.len(),
                    policy = %policy,
                    "ambiguous reference"
                );
                match policy {
                    AmbiguityPolicy::UseAll => ids.to_vec(),
                    AmbiguityPolicy::FirstLexicographic => {
                        ids.iter().min().cloned().into_iter().collect()
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build an index over a batch of entities.
///
/// `key_extractor` yields zero or more keys per entity. Entities sharing a
/// key are all kept under it, in processing order.
pub fn build_index<'a, T, K, I, F, Ks>(entities: I, key_extractor: F) -> CrossReferenceIndex<K>
where
    T: EntityAttributes + 'a,
    K: Eq + Hash,
    I: IntoIterator<Item = &'a Extracted<T>>,
    F: FnMut(&Extracted<T>) -> Ks,
    Ks: IntoIterator<Item = K>,
{
    let mut index = CrossReferenceIndex::new();
    index.extend(entities, key_extractor);
    index
}
