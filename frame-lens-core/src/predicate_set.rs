use crate::predicate::{Operator, Predicate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable handle for a predicate. Issued from a monotonic counter, so a key is
/// never handed out twice within one set, even after removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PredicateKey(u64);

impl PredicateKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateUpdate {
    Field(Option<String>),
    Operator(Option<Operator>),
    Literal(Option<String>),
}

/// Ordered, keyed collection of predicates combined by AND.
///
/// Keys increase with every add, so iterating the map in key order is
/// iterating in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PredicateSet {
    next_key: u64,
    entries: BTreeMap<PredicateKey, Predicate>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a blank (inert) predicate and returns its key.
    pub fn add(&mut self) -> PredicateKey {
        self.add_with(Predicate::blank())
    }

    pub fn add_with(&mut self, predicate: Predicate) -> PredicateKey {
        let key = PredicateKey(self.next_key);
        self.next_key += 1;
        self.entries.insert(key, predicate);
        key
    }

    /// Missing keys are a no-op.
    pub fn remove(&mut self, key: PredicateKey) -> Option<Predicate> {
        self.entries.remove(&key)
    }

    /// Returns false when the key is unknown.
    pub fn update(&mut self, key: PredicateKey, update: PredicateUpdate) -> bool {
        let Some(p) = self.entries.get_mut(&key) else {
            return false;
        };
        match update {
            PredicateUpdate::Field(v) => p.field = v,
            PredicateUpdate::Operator(v) => p.operator = v,
            PredicateUpdate::Literal(v) => p.literal = v,
        }
        true
    }

    pub fn get(&self, key: PredicateKey) -> Option<&Predicate> {
        self.entries.get(&key)
    }

    pub fn list(&self) -> impl Iterator<Item = (PredicateKey, &Predicate)> + '_ {
        self.entries.iter().map(|(k, p)| (*k, p))
    }

    pub fn keys(&self) -> Vec<PredicateKey> {
        self.entries.keys().copied().collect()
    }

    /// Predicates with every part filled in.
    pub fn active(&self) -> impl Iterator<Item = (PredicateKey, &Predicate)> + '_ {
        self.list().filter(|(_, p)| !p.is_inert())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
