#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Client-side identity generation and reserved identities.
pub mod client_id;
/// Advisory diagnostics sinks and warning types.
pub mod diagnostics;
/// Identity-addressed record and value model.
pub mod record;
/// The selection-tree walker and its result payloads.
pub mod normalizer;
/// Compiled selection-tree data model and storage-key derivation.
pub mod selection;
/// Mutable record source and store-level refinement policy.
pub mod store;
/// Shared type aliases and reserved storage keys.
pub mod types;

mod errors;

pub use client_id::{generate_client_id, generate_type_id, is_client_id, is_type_id, ROOT_ID, TYPE_SCHEMA_TYPE};
pub use diagnostics::{CollectingSink, DiagnosticsSink, NoopSink, NormalizeWarning, TracingSink};
pub use errors::NormalizeError;
pub use normalizer::{
    normalize, DeferPlaceholder, DeferSelector, HandleFieldPayload, IdentityResolver,
    IncrementalPlaceholder, ModuleImportPayload, NormalizationOptions, NormalizedResponse,
    PayloadObject, Selector, StreamPlaceholder,
};
pub use record::{Record, RecordValue};
pub use selection::{Argument, ArgumentValue, Selection};
pub use store::{RecordSource, RefinementMode};
pub use types::{DataId, PathSegment, StorageKey, TypeName, Variables, TYPENAME_KEY};
