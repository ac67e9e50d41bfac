//! # Execution Storage
//!
//! Key/value storage seen by SLOAD and SSTORE during one execution.
//!
//! The interpreter owns one instance per run. Seeding it from durable contract
//! state and writing it back afterwards is the world-state layer's job.

use crate::domain::value_objects::Word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Word-keyed storage for a single execution.
///
/// Unset keys read as zero. Ordered so that snapshots compare and serialize
/// deterministically.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage {
    slots: BTreeMap<Word, Word>,
}

impl Storage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Load a value (SLOAD). Returns zero if the key has not been set.
    #[must_use]
    pub fn get(&self, key: Word) -> Word {
        self.slots.get(&key).copied().unwrap_or_default()
    }

    /// Store a value (SSTORE), inserting or overwriting.
    pub fn set(&mut self, key: Word, value: Word) {
        self.slots.insert(key, value);
    }

    /// Returns true if `key` has been written.
    #[must_use]
    pub fn contains(&self, key: Word) -> bool {
        self.slots.contains_key(&key)
    }

    /// Number of written slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over written slots in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Word, Word)> + '_ {
        self.slots.iter().map(|(k, v)| (*k, *v))
    }

    /// Remove every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl FromIterator<(Word, Word)> for Storage {
    fn from_iter<I: IntoIterator<Item = (Word, Word)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<Word, Word>> for Storage {
    fn from(slots: BTreeMap<Word, Word>) -> Self {
        Self { slots }
    }
}

impl From<Storage> for BTreeMap<Word, Word> {
    fn from(storage: Storage) -> Self {
        storage.slots
    }
}

// =============================================================================
// TESTS
// =============================================================================
