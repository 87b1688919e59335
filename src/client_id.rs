//! Deterministic client-side identity generation.
//!
//! Server identities are authoritative and arrive in payloads; records that
//! lack one get a synthetic identity derived from their position in the
//! graph. The derivation is pure, so repeated normalization of the same
//! shape reuses the same identity instead of minting a new one each time.

use crate::types::{DataId, StorageKey, TypeName};

const CLIENT_ID_PREFIX: &str = "client:";
const TYPE_ID_PREFIX: &str = "client:__type:";

/// Identity of the designated root record anchoring every normalization.
pub const ROOT_ID: &str = "client:root";
/// Type name shared by all type-refinement records.
pub const TYPE_SCHEMA_TYPE: &str = "__TypeSchema";

/// Derive a client identity for a record reached through `storage_key` on
/// the record identified by `parent_id`. `index` is set for plural links.
pub fn generate_client_id(
    parent_id: &str,
    storage_key: &StorageKey,
    index: Option<usize>,
) -> DataId {
    let mut id = format!("{CLIENT_ID_PREFIX}{parent_id}:{storage_key}");
    if let Some(index) = index {
        id.push(':');
        id.push_str(&index.to_string());
    }
    id
}

/// Whether `id` was generated client-side (as opposed to server-assigned).
pub fn is_client_id(id: &str) -> bool {
    id.starts_with(CLIENT_ID_PREFIX)
}

/// Identity of the type-refinement record memoizing interface membership
/// facts for `type_name`.
pub fn generate_type_id(type_name: &TypeName) -> DataId {
    format!("{TYPE_ID_PREFIX}{type_name}")
}

/// Whether `id` addresses a type-refinement record.
pub fn is_type_id(id: &str) -> bool {
    id.starts_with(TYPE_ID_PREFIX)
}
