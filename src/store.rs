use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::types::DataId;

/// Policy for fragments and discriminators gated on an abstract type.
///
/// This is a property of the store, not of an individual normalization call:
/// mixing both policies against one record source produces inconsistent
/// missing-field strictness across payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinementMode {
    /// Descend into an abstract-gated subtree only when the payload carries
    /// the interface's membership marker key; memoize the answer.
    #[default]
    Precise,
    /// Always descend, but relax missing-field strictness for descendants
    /// when the marker key is absent.
    Legacy,
}

/// Mutable mapping from identity to record, exclusively owned by the caller
/// and handed to the normalizer for the duration of one call.
///
/// Missing lookups during traversal mean "create a new record"; only the
/// designated root record must exist before normalization begins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSource {
    records: IndexMap<DataId, Record>,
    refinement: RefinementMode,
}

impl RecordSource {
    /// Create an empty source using precise abstract-type refinement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty source with an explicit refinement policy.
    pub fn with_refinement(refinement: RefinementMode) -> Self {
        Self {
            records: IndexMap::new(),
            refinement,
        }
    }

    /// The store-level abstract-type refinement policy.
    pub fn refinement(&self) -> RefinementMode {
        self.refinement
    }

    /// Read the record stored under `id`, if any.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Mutably borrow the record stored under `id`, if any.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    /// Insert or replace the record stored under `id`.
    pub fn set(&mut self, id: DataId, record: Record) {
        self.records.insert(id, record);
    }

    /// Whether a record is stored under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&DataId, &Record)> {
        self.records.iter()
    }
}
