//! Advisory diagnostics for suspect payload data.
//!
//! Warnings never change control flow: normalization proceeds with
//! last-write-wins semantics and the sink only records that an overwrite or
//! omission looked like a data inconsistency. Production callers typically
//! pass [`NoopSink`]; tests and development builds use [`CollectingSink`] or
//! [`TracingSink`].

use serde_json::Value;
use tracing::warn;

use crate::types::{DataId, StorageKey, TypeName};

/// One advisory inconsistency observed during normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizeWarning {
    /// The payload did not contain a value for an expected field.
    MissingField {
        /// Key the field was expected under in the payload.
        response_key: String,
        /// Storage key the field would have been written to.
        storage_key: StorageKey,
    },
    /// Two scalar writes to the same storage key disagreed within one payload.
    ConflictingScalar {
        /// Identity of the record holding the field.
        data_id: DataId,
        /// Storage key of the conflicting field.
        storage_key: StorageKey,
        /// Value that was overwritten.
        previous: Value,
        /// Value that won.
        next: Value,
    },
    /// Two linked-field writes resolved different identities for one slot.
    ConflictingLink {
        /// Storage key of the conflicting field.
        storage_key: StorageKey,
        /// Identity that was overwritten.
        previous_id: DataId,
        /// Identity that won.
        next_id: DataId,
    },
    /// A record was reused under a different type name; two logically
    /// distinct entities likely share one identity.
    TypeMismatch {
        /// Identity shared by the conflicting objects.
        data_id: DataId,
        /// Type the record already carried.
        previous_type: TypeName,
        /// Type the payload asserted.
        next_type: TypeName,
    },
    /// A defer/stream `if` argument resolved to a non-boolean value.
    NonBooleanCondition {
        /// Label of the defer/stream position.
        label: String,
        /// The non-boolean value the condition resolved to.
        value: Value,
    },
}

/// Side channel for advisory warnings, injected into the walker.
pub trait DiagnosticsSink {
    /// Report one advisory inconsistency.
    fn warn(&mut self, warning: NormalizeWarning);
}

/// Discards all warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn warn(&mut self, _warning: NormalizeWarning) {}
}

/// Accumulates warnings for later inspection.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    /// Warnings in the order they were reported.
    pub warnings: Vec<NormalizeWarning>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no warnings have been reported.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn warn(&mut self, warning: NormalizeWarning) {
        self.warnings.push(warning);
    }
}

/// Reports warnings through `tracing` at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn warn(&mut self, warning: NormalizeWarning) {
        match &warning {
            NormalizeWarning::MissingField {
                response_key,
                storage_key,
            } => warn!(
                %response_key,
                %storage_key,
                "payload did not contain a value for an expected field; \
                 check that the payload was fetched with the same query"
            ),
            NormalizeWarning::ConflictingScalar {
                data_id,
                storage_key,
                previous,
                next,
            } => warn!(
                %data_id,
                %storage_key,
                %previous,
                %next,
                "payload contains two instances of the same id with conflicting field values"
            ),
            NormalizeWarning::ConflictingLink {
                storage_key,
                previous_id,
                next_id,
            } => warn!(
                %storage_key,
                %previous_id,
                %next_id,
                "payload contains conflicting references for one linked field"
            ),
            NormalizeWarning::TypeMismatch {
                data_id,
                previous_type,
                next_type,
            } => warn!(
                %data_id,
                %previous_type,
                %next_type,
                "record was assigned conflicting types; the server likely \
                 returned the same id for different objects"
            ),
            NormalizeWarning::NonBooleanCondition { label, value } => warn!(
                %label,
                %value,
                "expected defer/stream `if` argument to be a boolean"
            ),
        }
    }
}
