use thiserror::Error;

use crate::types::{DataId, StorageKey, VariableName};

/// Fatal normalization failures.
///
/// Each variant marks a contract violation between collaborators (the query
/// compiler that produced the selection tree, or the transport that produced
/// the payload), not a recoverable data problem. Advisory data issues go
/// through the diagnostics sink instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The designated root record was absent from the record source.
    #[error("expected root record `{0}` to exist before normalization")]
    MissingRootRecord(DataId),
    /// A condition or argument referenced a variable with no binding.
    #[error("undefined variable `{0}` referenced by the selection tree")]
    UndefinedVariable(VariableName),
    /// The payload held a non-object where the selection tree expected one.
    #[error("expected payload for `{at}` to be an object")]
    ExpectedObject {
        /// Storage key of the offending field, or the root identity.
        at: String,
    },
    /// The payload held a non-array for a plural linked field.
    #[error("expected payload for field `{storage_key}` to be an array of objects")]
    ExpectedArray {
        /// Storage key of the offending field.
        storage_key: StorageKey,
    },
    /// A polymorphic linked object carried no reserved type-name key.
    #[error("expected a typename in the payload object for field `{storage_key}`")]
    MissingTypename {
        /// Storage key of the offending field.
        storage_key: StorageKey,
    },
    /// The external identity resolver produced a non-string identity.
    #[error("expected id resolved for field `{storage_key}` to be a string, got `{actual}`")]
    NonStringId {
        /// Storage key of the offending field.
        storage_key: StorageKey,
        /// The non-string value the resolver returned.
        actual: serde_json::Value,
    },
}
