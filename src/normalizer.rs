//! The selection-tree walker.
//!
//! Flattens one nested response payload into identity-addressed records,
//! guided by a compiled selection tree. The walk is synchronous and
//! depth-first; every write lands in the record source immediately
//! (last-write-wins, no staging). Work that cannot be resolved within the
//! call — deferred/streamed chunks, dynamically imported sub-documents,
//! client-side handle transforms — comes back as inert descriptors for
//! collaborators to schedule.

use serde_json::{Map, Value};

use crate::client_id::{generate_client_id, generate_type_id, is_client_id, ROOT_ID, TYPE_SCHEMA_TYPE};
use crate::diagnostics::{DiagnosticsSink, NormalizeWarning};
use crate::errors::NormalizeError;
use crate::record::{Record, RecordValue};
use crate::selection::{
    argument_values, handle_storage_key, module_component_key, module_operation_key, storage_key,
    variable_value, Defer, HandleField, InlineFragment, LinkedField, ModuleImport, ScalarField,
    Selection, Stream,
};
use crate::store::{RecordSource, RefinementMode};
use crate::types::{DataId, PathSegment, StorageKey, TypeName, Variables, TYPENAME_KEY};

/// JSON object at one position of a response payload.
pub type PayloadObject = Map<String, Value>;

/// Supplies a server identity for a linked payload object, ahead of any
/// stored or client-generated identity. Returning `None` (or null, or an
/// empty string) falls through to the next resolution step.
pub trait IdentityResolver {
    /// Produce an identity for `object`, normalized under `type_name`.
    fn resolve(&self, object: &PayloadObject, type_name: &str) -> Option<Value>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&PayloadObject, &str) -> Option<Value>,
{
    fn resolve(&self, object: &PayloadObject, type_name: &str) -> Option<Value> {
        self(object, type_name)
    }
}

/// Anchors a selection tree at a record identity with variable bindings.
#[derive(Clone, Debug)]
pub struct Selector<'a> {
    /// Identity of the record the tree is anchored at.
    pub data_id: DataId,
    /// Root selections of the compiled tree.
    pub selections: &'a [Selection],
    /// Variable bindings for conditions and arguments.
    pub variables: &'a Variables,
}

/// Per-call normalization options.
pub struct NormalizationOptions<'a> {
    /// External identity resolver consulted first for every linked object.
    pub identity_resolver: Option<&'a dyn IdentityResolver>,
    /// Opt-in for servers that prune null fields from payloads: absent
    /// fields are written as explicit nulls instead of warned about.
    pub treat_missing_fields_as_null: bool,
    /// Starting path segments, for payloads that are themselves a chunk
    /// rooted below the operation.
    pub path: Vec<PathSegment>,
}

impl Default for NormalizationOptions<'_> {
    fn default() -> Self {
        Self {
            identity_resolver: None,
            treat_missing_fields_as_null: false,
            path: Vec::new(),
        }
    }
}

/// Descriptor for a client-side handle transform to be applied by a
/// collaborator after normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct HandleFieldPayload {
    /// Resolved arguments of the underlying field.
    pub args: Variables,
    /// Identity of the record owning the field.
    pub data_id: DataId,
    /// Storage key the raw field value lives under.
    pub field_key: StorageKey,
    /// Name of the transform to run.
    pub handle: String,
    /// Storage key the transformed output is written under.
    pub handle_key: StorageKey,
    /// Resolved arguments of the transform itself.
    pub handle_args: Variables,
}

/// Selector a deferred sub-payload will be normalized against once its
/// chunk arrives.
#[derive(Clone, Debug, PartialEq)]
pub struct DeferSelector {
    /// Identity of the record the deferred selections apply to.
    pub data_id: DataId,
    /// The defer node to traverse when the chunk arrives.
    pub node: Defer,
    /// Variable bindings in effect at the defer position.
    pub variables: Variables,
}

/// Bookkeeping for a deferred fragment awaiting a later chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct DeferPlaceholder {
    /// Raw sub-payload at the defer position.
    pub data: PayloadObject,
    /// Label correlating later chunks with this position.
    pub label: String,
    /// Response path from the root to the defer position.
    pub path: Vec<PathSegment>,
    /// Selector to normalize the arriving chunk against.
    pub selector: DeferSelector,
    /// Concrete type of the record at the defer position.
    pub type_name: TypeName,
}

/// Bookkeeping for a streamed list awaiting later items.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamPlaceholder {
    /// Label correlating streamed items with this position.
    pub label: String,
    /// Response path from the root to the stream position.
    pub path: Vec<PathSegment>,
    /// Identity of the record owning the streamed list.
    pub parent_id: DataId,
    /// The stream node to traverse for each arriving item.
    pub node: Stream,
    /// Variable bindings in effect at the stream position.
    pub variables: Variables,
}

/// Unresolved incremental-delivery work handed back to the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum IncrementalPlaceholder {
    /// A deferred fragment awaiting a later chunk.
    Defer(DeferPlaceholder),
    /// A streamed list awaiting later items.
    Stream(StreamPlaceholder),
}

/// Everything a collaborator needs to fetch and normalize a dynamically
/// selected sub-document.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleImportPayload {
    /// Raw payload at the module boundary.
    pub data: PayloadObject,
    /// Identity of the record the import was selected on.
    pub data_id: DataId,
    /// Operation reference naming the sub-document to fetch.
    pub operation_reference: Value,
    /// Response path from the root to the module position.
    pub path: Vec<PathSegment>,
    /// Concrete type of the record at the module position.
    pub type_name: TypeName,
    /// Variable bindings in effect at the module position.
    pub variables: Variables,
}

/// Structured result of one normalization call. The record source itself is
/// mutated in place through the `&mut` handle passed to [`normalize`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedResponse {
    /// Handle transforms for a collaborator to apply.
    pub field_payloads: Vec<HandleFieldPayload>,
    /// Deferred/streamed work for an incremental-delivery scheduler.
    pub incremental_placeholders: Vec<IncrementalPlaceholder>,
    /// Sub-documents for a dynamic-document loader to fetch.
    pub module_import_payloads: Vec<ModuleImportPayload>,
    /// Always `false`: a normalized chunk never proves the response
    /// complete; finality is decided by the transport.
    pub is_final: bool,
}

/// Normalize `payload` into `source`, anchored at the selector's record.
///
/// Fatal errors mark contract violations by the collaborator that produced
/// the selector or the payload: an absent root record, an undefined
/// variable, a payload shape that contradicts the selection tree, or a
/// non-string resolved identity. Suspect-but-tolerable data goes through
/// `sink` without affecting the walk.
pub fn normalize(
    source: &mut RecordSource,
    selector: Selector<'_>,
    payload: &Value,
    options: NormalizationOptions<'_>,
    sink: &mut dyn DiagnosticsSink,
) -> Result<NormalizedResponse, NormalizeError> {
    if !source.contains(&selector.data_id) {
        return Err(NormalizeError::MissingRootRecord(selector.data_id));
    }
    let data = payload
        .as_object()
        .ok_or_else(|| NormalizeError::ExpectedObject {
            at: selector.data_id.clone(),
        })?;
    let mut walker = Walker {
        source,
        variables: selector.variables,
        identity_resolver: options.identity_resolver,
        treat_missing_fields_as_null: options.treat_missing_fields_as_null,
        sink,
        path: options.path,
        field_payloads: Vec::new(),
        incremental_placeholders: Vec::new(),
        module_import_payloads: Vec::new(),
    };
    walker.traverse_selections(selector.selections, &selector.data_id, data, Context::default())?;
    Ok(NormalizedResponse {
        field_payloads: walker.field_payloads,
        incremental_placeholders: walker.incremental_placeholders,
        module_import_payloads: walker.module_import_payloads,
        is_final: false,
    })
}

/// Traversal-scoped flags, threaded down the recursion by value so the
/// parent's state is restored by ordinary stack unwinding.
#[derive(Clone, Copy, Debug, Default)]
struct Context {
    /// Inside a client-extension subtree: server payloads are not expected
    /// to populate these fields.
    is_client_extension: bool,
    /// Inside a legacy-mode abstract subtree the record does not satisfy:
    /// field omission is legitimate.
    is_unmatched_abstract_type: bool,
}

struct Walker<'a> {
    source: &'a mut RecordSource,
    variables: &'a Variables,
    identity_resolver: Option<&'a dyn IdentityResolver>,
    treat_missing_fields_as_null: bool,
    sink: &'a mut dyn DiagnosticsSink,
    path: Vec<PathSegment>,
    field_payloads: Vec<HandleFieldPayload>,
    incremental_placeholders: Vec<IncrementalPlaceholder>,
    module_import_payloads: Vec<ModuleImportPayload>,
}

impl Walker<'_> {
    fn traverse_selections(
        &mut self,
        selections: &[Selection],
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        for selection in selections {
            match selection {
                Selection::ScalarField(field) => {
                    self.normalize_scalar_field(field, record_id, data, ctx)?;
                }
                Selection::LinkedField(field) => {
                    self.normalize_linked_field(field, record_id, data, ctx)?;
                }
                Selection::Condition(condition) => {
                    let value = variable_value(self.variables, &condition.condition)?;
                    if value.as_bool() == Some(condition.passing_value) {
                        self.traverse_selections(&condition.selections, record_id, data, ctx)?;
                    }
                }
                Selection::InlineFragment(fragment) => {
                    self.normalize_inline_fragment(fragment, record_id, data, ctx)?;
                }
                Selection::TypeDiscriminator(discriminator) => {
                    // Legacy mode records no membership facts here, matching
                    // its always-traverse reading of abstract selections.
                    if self.source.refinement() == RefinementMode::Precise {
                        let implements = data.contains_key(&discriminator.abstract_key);
                        self.memoize_refinement(record_id, &discriminator.abstract_key, implements);
                    }
                }
                Selection::ScalarHandle(handle) | Selection::LinkedHandle(handle) => {
                    self.emit_handle(handle, record_id)?;
                }
                Selection::ModuleImport(module) => {
                    self.normalize_module_import(module, record_id, data)?;
                }
                Selection::Defer(defer) => {
                    self.normalize_defer(defer, record_id, data, ctx)?;
                }
                Selection::Stream(stream) => {
                    self.normalize_stream(stream, record_id, data, ctx)?;
                }
                Selection::ClientExtension(extension) => {
                    let ctx = Context {
                        is_client_extension: true,
                        ..ctx
                    };
                    self.traverse_selections(&extension.selections, record_id, data, ctx)?;
                }
            }
        }
        Ok(())
    }

    fn normalize_inline_fragment(
        &mut self,
        fragment: &InlineFragment,
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let Some(abstract_key) = &fragment.abstract_key else {
            // Concrete-type gate: descend only on an exact type match.
            if self.record(record_id).typename() == &fragment.type_name {
                self.traverse_selections(&fragment.selections, record_id, data, ctx)?;
            }
            return Ok(());
        };
        let implements = data.contains_key(abstract_key);
        match self.source.refinement() {
            RefinementMode::Precise => {
                self.memoize_refinement(record_id, abstract_key, implements);
                if implements {
                    self.traverse_selections(&fragment.selections, record_id, data, ctx)?;
                }
            }
            RefinementMode::Legacy => {
                // Always traverse, but track the mismatch so descendants
                // tolerate fields the server legitimately omitted.
                let ctx = Context {
                    is_unmatched_abstract_type: ctx.is_unmatched_abstract_type || !implements,
                    ..ctx
                };
                self.traverse_selections(&fragment.selections, record_id, data, ctx)?;
            }
        }
        Ok(())
    }

    /// Persist an interface-membership fact on the type-refinement record
    /// for the current record's concrete type.
    fn memoize_refinement(&mut self, record_id: &str, abstract_key: &str, implements: bool) {
        let type_name = self.record(record_id).typename().clone();
        let type_id = generate_type_id(&type_name);
        if !self.source.contains(&type_id) {
            self.source
                .set(type_id.clone(), Record::new(type_id.clone(), TYPE_SCHEMA_TYPE.into()));
        }
        self.record_mut(&type_id)
            .set_value(abstract_key.to_string(), RecordValue::Scalar(Value::Bool(implements)));
    }

    fn emit_handle(&mut self, handle: &HandleField, record_id: &str) -> Result<(), NormalizeError> {
        let args = argument_values(&handle.args, self.variables)?;
        let field_key = storage_key(&handle.name, &handle.args, self.variables)?;
        let handle_key = handle_storage_key(handle, self.variables)?;
        let handle_args = argument_values(&handle.handle_args, self.variables)?;
        self.field_payloads.push(HandleFieldPayload {
            args,
            data_id: record_id.to_string(),
            field_key,
            handle: handle.handle.clone(),
            handle_key,
            handle_args,
        });
        Ok(())
    }

    fn normalize_module_import(
        &mut self,
        module: &ModuleImport,
        record_id: &str,
        data: &PayloadObject,
    ) -> Result<(), NormalizeError> {
        let type_name = self.record(record_id).typename().clone();
        let component_key = module_component_key(&module.document_name);
        let component = data.get(&component_key).cloned().unwrap_or(Value::Null);
        self.record_mut(record_id)
            .set_value(component_key, scalar_or_null(component));
        let operation_key = module_operation_key(&module.document_name);
        let operation = data.get(&operation_key).cloned().unwrap_or(Value::Null);
        self.record_mut(record_id)
            .set_value(operation_key, scalar_or_null(operation.clone()));
        if !operation.is_null() {
            self.module_import_payloads.push(ModuleImportPayload {
                data: data.clone(),
                data_id: record_id.to_string(),
                operation_reference: operation,
                path: self.path.clone(),
                type_name,
                variables: self.variables.clone(),
            });
        }
        Ok(())
    }

    fn normalize_defer(
        &mut self,
        defer: &Defer,
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let is_deferred = match &defer.if_condition {
            None => true,
            Some(name) => {
                let value = variable_value(self.variables, name)?.clone();
                match value.as_bool() {
                    Some(enabled) => enabled,
                    None => {
                        self.sink.warn(NormalizeWarning::NonBooleanCondition {
                            label: defer.label.clone(),
                            value,
                        });
                        true
                    }
                }
            }
        };
        if !is_deferred {
            // No additional chunk is coming: the data is already present.
            return self.traverse_selections(&defer.selections, record_id, data, ctx);
        }
        let type_name = self.record(record_id).typename().clone();
        self.incremental_placeholders
            .push(IncrementalPlaceholder::Defer(DeferPlaceholder {
                data: data.clone(),
                label: defer.label.clone(),
                path: self.path.clone(),
                selector: DeferSelector {
                    data_id: record_id.to_string(),
                    node: defer.clone(),
                    variables: self.variables.clone(),
                },
                type_name,
            }));
        Ok(())
    }

    fn normalize_stream(
        &mut self,
        stream: &Stream,
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        // Initially delivered items are always applied, whether or not
        // streaming is enabled for this request.
        self.traverse_selections(&stream.selections, record_id, data, ctx)?;
        let is_streamed = match &stream.if_condition {
            None => true,
            Some(name) => {
                let value = variable_value(self.variables, name)?.clone();
                match value.as_bool() {
                    Some(enabled) => enabled,
                    None => {
                        self.sink.warn(NormalizeWarning::NonBooleanCondition {
                            label: stream.label.clone(),
                            value,
                        });
                        false
                    }
                }
            }
        };
        if is_streamed {
            self.incremental_placeholders
                .push(IncrementalPlaceholder::Stream(StreamPlaceholder {
                    label: stream.label.clone(),
                    path: self.path.clone(),
                    parent_id: record_id.to_string(),
                    node: stream.clone(),
                    variables: self.variables.clone(),
                }));
        }
        Ok(())
    }

    fn normalize_scalar_field(
        &mut self,
        field: &ScalarField,
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let response_key = field.response_key();
        let storage_key = storage_key(&field.name, &field.args, self.variables)?;
        match data.get(response_key) {
            None => {
                if self.skip_missing_field(response_key, &storage_key, ctx) {
                    return Ok(());
                }
                self.check_conflicting_scalar(record_id, &storage_key, &Value::Null);
                self.record_mut(record_id).set_value(storage_key, RecordValue::Null);
            }
            Some(Value::Null) => {
                self.check_conflicting_scalar(record_id, &storage_key, &Value::Null);
                self.record_mut(record_id).set_value(storage_key, RecordValue::Null);
            }
            Some(value) => {
                self.check_conflicting_scalar(record_id, &storage_key, value);
                self.record_mut(record_id)
                    .set_value(storage_key, RecordValue::Scalar(value.clone()));
            }
        }
        Ok(())
    }

    fn normalize_linked_field(
        &mut self,
        field: &LinkedField,
        record_id: &str,
        data: &PayloadObject,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let response_key = field.response_key();
        let storage_key = storage_key(&field.name, &field.args, self.variables)?;
        match data.get(response_key) {
            None => {
                if self.skip_missing_field(response_key, &storage_key, ctx) {
                    return Ok(());
                }
                self.record_mut(record_id).set_value(storage_key, RecordValue::Null);
            }
            Some(Value::Null) => {
                self.record_mut(record_id).set_value(storage_key, RecordValue::Null);
            }
            Some(value) => {
                self.path.push(response_key.to_string());
                let outcome = if field.plural {
                    self.normalize_plural_link(field, record_id, &storage_key, value, ctx)
                } else {
                    self.normalize_link(field, record_id, &storage_key, value, ctx)
                };
                self.path.pop();
                outcome?;
            }
        }
        Ok(())
    }

    /// Decide whether a field absent from the payload should be skipped.
    /// Returns `false` only when the caller opted into writing nulls for
    /// missing fields; otherwise skips, warning unless omission is
    /// legitimate at this position.
    fn skip_missing_field(&mut self, response_key: &str, storage_key: &StorageKey, ctx: Context) -> bool {
        if ctx.is_client_extension || ctx.is_unmatched_abstract_type {
            return true;
        }
        if self.treat_missing_fields_as_null {
            return false;
        }
        self.sink.warn(NormalizeWarning::MissingField {
            response_key: response_key.to_string(),
            storage_key: storage_key.clone(),
        });
        true
    }

    fn normalize_link(
        &mut self,
        field: &LinkedField,
        record_id: &str,
        storage_key: &StorageKey,
        value: &Value,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let object = value
            .as_object()
            .ok_or_else(|| NormalizeError::ExpectedObject {
                at: storage_key.clone(),
            })?;
        let type_name = self.link_type_name(field, object, storage_key)?;
        let prev_id = self.record(record_id).linked_id(storage_key).cloned();
        let next_id =
            self.resolve_link_id(object, &type_name, prev_id.as_ref(), record_id, storage_key, None)?;
        if let Some(prev_id) = &prev_id {
            if *prev_id != next_id {
                self.sink.warn(NormalizeWarning::ConflictingLink {
                    storage_key: storage_key.clone(),
                    previous_id: prev_id.clone(),
                    next_id: next_id.clone(),
                });
            }
        }
        self.record_mut(record_id)
            .set_linked_id(storage_key.clone(), Some(next_id.clone()));
        self.ensure_record(&next_id, &type_name);
        self.traverse_selections(&field.selections, &next_id, object, ctx)
    }

    fn normalize_plural_link(
        &mut self,
        field: &LinkedField,
        record_id: &str,
        storage_key: &StorageKey,
        value: &Value,
        ctx: Context,
    ) -> Result<(), NormalizeError> {
        let items = value
            .as_array()
            .ok_or_else(|| NormalizeError::ExpectedArray {
                storage_key: storage_key.clone(),
            })?;
        let prev_ids: Option<Vec<Option<DataId>>> = self
            .record(record_id)
            .linked_ids(storage_key)
            .map(|ids| ids.to_vec());
        let mut next_ids = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                next_ids.push(None);
                continue;
            }
            self.path.push(index.to_string());
            let object = item
                .as_object()
                .ok_or_else(|| NormalizeError::ExpectedObject {
                    at: storage_key.clone(),
                })?;
            let type_name = self.link_type_name(field, object, storage_key)?;
            let prev_id = prev_ids
                .as_ref()
                .and_then(|ids| ids.get(index))
                .and_then(|id| id.as_ref());
            let next_id = self.resolve_link_id(
                object,
                &type_name,
                prev_id,
                record_id,
                storage_key,
                Some(index),
            )?;
            if let Some(prev_id) = prev_id {
                if *prev_id != next_id {
                    self.sink.warn(NormalizeWarning::ConflictingLink {
                        storage_key: storage_key.clone(),
                        previous_id: prev_id.clone(),
                        next_id: next_id.clone(),
                    });
                }
            }
            next_ids.push(Some(next_id.clone()));
            self.ensure_record(&next_id, &type_name);
            self.traverse_selections(&field.selections, &next_id, object, ctx)?;
            self.path.pop();
        }
        self.record_mut(record_id)
            .set_linked_ids(storage_key.clone(), next_ids);
        Ok(())
    }

    /// The concrete type a linked payload object normalizes under: the
    /// field's static type, or the payload's reserved type-name key when
    /// the field is polymorphic.
    fn link_type_name(
        &self,
        field: &LinkedField,
        object: &PayloadObject,
        storage_key: &StorageKey,
    ) -> Result<TypeName, NormalizeError> {
        if let Some(concrete_type) = &field.concrete_type {
            return Ok(concrete_type.clone());
        }
        match object.get(TYPENAME_KEY).and_then(Value::as_str) {
            Some(type_name) => Ok(type_name.to_string()),
            None => Err(NormalizeError::MissingTypename {
                storage_key: storage_key.clone(),
            }),
        }
    }

    /// Resolve the identity a linked object is stored under. First
    /// non-empty wins: external resolver, the identity already stored for
    /// this slot, a fresh client identity.
    fn resolve_link_id(
        &self,
        object: &PayloadObject,
        type_name: &TypeName,
        prev_id: Option<&DataId>,
        parent_id: &str,
        storage_key: &StorageKey,
        index: Option<usize>,
    ) -> Result<DataId, NormalizeError> {
        if let Some(resolver) = self.identity_resolver {
            match resolver.resolve(object, type_name) {
                Some(Value::String(id)) if !id.is_empty() => return Ok(id),
                Some(Value::String(_)) | Some(Value::Null) | None => {}
                Some(other) => {
                    return Err(NormalizeError::NonStringId {
                        storage_key: storage_key.clone(),
                        actual: other,
                    });
                }
            }
        }
        if let Some(prev_id) = prev_id {
            return Ok(prev_id.clone());
        }
        Ok(generate_client_id(parent_id, storage_key, index))
    }

    /// Create the target record if absent; otherwise check that its stored
    /// type is consistent with this write (advisory only, and suppressed
    /// for client-generated identities other than the root).
    fn ensure_record(&mut self, id: &DataId, type_name: &TypeName) {
        match self.source.get(id) {
            None => {
                self.source
                    .set(id.clone(), Record::new(id.clone(), type_name.clone()));
            }
            Some(record) => {
                let suppressed = is_client_id(id) && id != ROOT_ID;
                if !suppressed && record.typename() != type_name {
                    self.sink.warn(NormalizeWarning::TypeMismatch {
                        data_id: id.clone(),
                        previous_type: record.typename().clone(),
                        next_type: type_name.clone(),
                    });
                }
            }
        }
    }

    /// Flag a scalar overwrite that changes the stored value within one
    /// payload. The reserved type-name key is exempt.
    fn check_conflicting_scalar(&mut self, record_id: &str, storage_key: &StorageKey, next: &Value) {
        if storage_key == TYPENAME_KEY {
            return;
        }
        let previous = match self.record(record_id).value(storage_key) {
            None => return,
            Some(RecordValue::Null) => Value::Null,
            Some(RecordValue::Scalar(value)) => value.clone(),
            Some(RecordValue::Link(id)) => serde_json::json!({ "__ref": id }),
            Some(RecordValue::LinkList(ids)) => serde_json::json!({ "__refs": ids }),
        };
        if previous != *next {
            let data_id = self.record(record_id).id().clone();
            self.sink.warn(NormalizeWarning::ConflictingScalar {
                data_id,
                storage_key: storage_key.clone(),
                previous,
                next: next.clone(),
            });
        }
    }

    fn record(&self, id: &str) -> &Record {
        self.source
            .get(id)
            .expect("record exists for the duration of traversal")
    }

    fn record_mut(&mut self, id: &str) -> &mut Record {
        self.source
            .get_mut(id)
            .expect("record exists for the duration of traversal")
    }
}

fn scalar_or_null(value: Value) -> RecordValue {
    if value.is_null() {
        RecordValue::Null
    } else {
        RecordValue::Scalar(value)
    }
}
