use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DataId, StorageKey, TypeName};

/// One stored value inside a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecordValue {
    /// Explicit null, written for both null scalars and null links.
    Null,
    /// Non-null scalar (string/number/bool/opaque JSON object).
    Scalar(Value),
    /// Reference to a single linked record.
    Link(DataId),
    /// Ordered references to linked records; `None` entries preserve
    /// positional holes delivered by the server.
    LinkList(Vec<Option<DataId>>),
}

/// Identity-addressed record: an insertion-ordered map from storage key to
/// value, plus the reserved identity and type name assigned at creation.
///
/// Normalization never deletes keys, only overwrites them; identity and type
/// are never reassigned (mismatches are reported as advisories instead).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: DataId,
    typename: TypeName,
    fields: IndexMap<StorageKey, RecordValue>,
}

impl Record {
    /// Create an empty record with the given identity and type name.
    pub fn new(id: DataId, typename: TypeName) -> Self {
        Self {
            id,
            typename,
            fields: IndexMap::new(),
        }
    }

    /// The record's identity (the `__id` reserved key).
    pub fn id(&self) -> &DataId {
        &self.id
    }

    /// The record's concrete type name (the `__typename` reserved key).
    pub fn typename(&self) -> &TypeName {
        &self.typename
    }

    /// Read a stored value; `None` means the key was never written.
    pub fn value(&self, storage_key: &str) -> Option<&RecordValue> {
        self.fields.get(storage_key)
    }

    /// Write a value, overwriting any previous one.
    pub fn set_value(&mut self, storage_key: StorageKey, value: RecordValue) {
        self.fields.insert(storage_key, value);
    }

    /// The stored single-link identity, if this key holds a non-null link.
    pub fn linked_id(&self, storage_key: &str) -> Option<&DataId> {
        match self.fields.get(storage_key) {
            Some(RecordValue::Link(id)) => Some(id),
            _ => None,
        }
    }

    /// Write a single link (`None` stores an explicit null link).
    pub fn set_linked_id(&mut self, storage_key: StorageKey, id: Option<DataId>) {
        let value = match id {
            Some(id) => RecordValue::Link(id),
            None => RecordValue::Null,
        };
        self.fields.insert(storage_key, value);
    }

    /// The stored plural-link identities, if this key holds a link list.
    pub fn linked_ids(&self, storage_key: &str) -> Option<&[Option<DataId>]> {
        match self.fields.get(storage_key) {
            Some(RecordValue::LinkList(ids)) => Some(ids),
            _ => None,
        }
    }

    /// Write a plural link list, overwriting any previous one.
    pub fn set_linked_ids(&mut self, storage_key: StorageKey, ids: Vec<Option<DataId>>) {
        self.fields.insert(storage_key, RecordValue::LinkList(ids));
    }

    /// Iterate stored fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&StorageKey, &RecordValue)> {
        self.fields.iter()
    }
}
