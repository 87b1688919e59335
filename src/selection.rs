//! Compiled selection-tree data model.
//!
//! A selection tree is the static shape of a query, produced by an external
//! compiler collaborator. The walker matches it against a response payload;
//! nothing here touches the record source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::NormalizeError;
use crate::types::{StorageKey, TypeName, VariableName, Variables};

/// One node of a compiled selection tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Selection {
    /// Leaf field holding a scalar value.
    ScalarField(ScalarField),
    /// Field linking to one record or a list of records.
    LinkedField(LinkedField),
    /// Subtree gated on a boolean variable.
    Condition(Condition),
    /// Subtree gated on a concrete type or abstract-type membership.
    InlineFragment(InlineFragment),
    /// Interface-membership fact recorded without descending.
    TypeDiscriminator(TypeDiscriminator),
    /// Client-side transform of a scalar field.
    ScalarHandle(HandleField),
    /// Client-side transform of a linked field.
    LinkedHandle(HandleField),
    /// Dynamically loaded sub-document reference.
    ModuleImport(ModuleImport),
    /// Subtree whose data may arrive in a later chunk.
    Defer(Defer),
    /// Plural subtree whose items may continue arriving in later chunks.
    Stream(Stream),
    /// Fields never expected from the server.
    ClientExtension(ClientExtension),
}

/// Leaf field holding a scalar value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Schema field name.
    pub name: String,
    /// Response alias, when the query renamed the field.
    #[serde(default)]
    pub alias: Option<String>,
    /// Applied arguments.
    #[serde(default)]
    pub args: Vec<Argument>,
}

impl ScalarField {
    /// The key this field appears under in the response payload.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Field linking to one record (or an ordered list of records when plural).
/// `concrete_type == None` marks a polymorphic field whose target type is
/// read from the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkedField {
    /// Schema field name.
    pub name: String,
    /// Response alias, when the query renamed the field.
    #[serde(default)]
    pub alias: Option<String>,
    /// Static target type; `None` for polymorphic fields.
    #[serde(default)]
    pub concrete_type: Option<TypeName>,
    /// Whether the field links to an ordered list of records.
    #[serde(default)]
    pub plural: bool,
    /// Applied arguments.
    #[serde(default)]
    pub args: Vec<Argument>,
    /// Selections applied to the linked record(s).
    #[serde(default)]
    pub selections: Vec<Selection>,
}

impl LinkedField {
    /// The key this field appears under in the response payload.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Subtree gated on a boolean variable. A single passing value expresses
/// both include and skip semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Variable whose boolean value gates the subtree.
    pub condition: VariableName,
    /// Value the variable must equal for the subtree to apply.
    pub passing_value: bool,
    /// Gated selections.
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Fragment gated on an exact concrete type, or on interface/union
/// membership when `abstract_key` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineFragment {
    /// Declared type of the fragment.
    pub type_name: TypeName,
    /// Membership marker key for an interface/union gate, when abstract.
    #[serde(default)]
    pub abstract_key: Option<String>,
    /// Gated selections.
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Records an interface-membership fact without descending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDiscriminator {
    /// Membership marker key for the interface/union.
    pub abstract_key: String,
}

/// Declared client-side field transform, applied by a collaborator after
/// normalization. Used for both scalar and linked handles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandleField {
    /// Schema field name the handle reads from.
    pub name: String,
    /// Response alias, when the query renamed the field.
    #[serde(default)]
    pub alias: Option<String>,
    /// Applied arguments of the underlying field.
    #[serde(default)]
    pub args: Vec<Argument>,
    /// Name of the transform to run.
    pub handle: String,
    /// Arguments passed to the transform itself.
    #[serde(default)]
    pub handle_args: Vec<Argument>,
}

/// Reference to a dynamically loaded sub-document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleImport {
    /// Name of the imported document, unique per module boundary.
    pub document_name: String,
}

/// Subtree whose data may arrive in a later response chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Defer {
    /// Variable gating the defer; `None` means unconditionally deferred.
    #[serde(default)]
    pub if_condition: Option<VariableName>,
    /// Label correlating later chunks with this position.
    pub label: String,
    /// Deferred selections.
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Plural subtree whose items may continue arriving in later chunks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    /// Variable gating the stream; `None` means unconditionally streamed.
    #[serde(default)]
    pub if_condition: Option<VariableName>,
    /// Label correlating later chunks with this position.
    pub label: String,
    /// Streamed selections.
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Subtree of fields never expected from the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientExtension {
    /// Client-only selections.
    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// One applied argument on a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Argument name as declared in the schema.
    pub name: String,
    /// Applied value.
    pub value: ArgumentValue,
}

/// Argument value: inline literal or a reference into the variable bindings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArgumentValue {
    /// Inline literal value.
    Literal(Value),
    /// Reference to a variable binding by name.
    Variable(VariableName),
}

/// Look up a variable binding; referencing an undefined variable is a
/// contract violation by the selector's producer.
pub fn variable_value<'a>(
    variables: &'a Variables,
    name: &str,
) -> Result<&'a Value, NormalizeError> {
    variables
        .get(name)
        .ok_or_else(|| NormalizeError::UndefinedVariable(name.to_string()))
}

/// Resolve applied arguments to a name→value map.
pub fn argument_values(
    args: &[Argument],
    variables: &Variables,
) -> Result<Variables, NormalizeError> {
    let mut values = Variables::with_capacity(args.len());
    for arg in args {
        let value = match &arg.value {
            ArgumentValue::Literal(value) => value.clone(),
            ArgumentValue::Variable(name) => variable_value(variables, name)?.clone(),
        };
        values.insert(arg.name.clone(), value);
    }
    Ok(values)
}

/// Derive the storage key for a field: the bare name when there are no
/// arguments, otherwise `name(a:json,b:json)` with arguments in declared
/// order so the same field+arguments always land on the same key.
pub fn storage_key(
    name: &str,
    args: &[Argument],
    variables: &Variables,
) -> Result<StorageKey, NormalizeError> {
    if args.is_empty() {
        return Ok(name.to_string());
    }
    let mut key = String::from(name);
    key.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let value = match &arg.value {
            ArgumentValue::Literal(value) => value.clone(),
            ArgumentValue::Variable(var) => variable_value(variables, var)?.clone(),
        };
        key.push_str(&arg.name);
        key.push(':');
        key.push_str(&value.to_string());
    }
    key.push(')');
    Ok(key)
}

/// Derive the storage key a handle's transformed output is written under:
/// `__{name}_{handle}` plus the field's argument suffix.
pub fn handle_storage_key(
    field: &HandleField,
    variables: &Variables,
) -> Result<StorageKey, NormalizeError> {
    let base = format!("__{}_{}", field.name, field.handle);
    storage_key(&base, &field.args, variables)
}

/// Reserved storage key holding the component reference of an imported
/// document.
pub fn module_component_key(document_name: &str) -> StorageKey {
    format!("__module_component_{document_name}")
}

/// Reserved storage key holding the operation reference of an imported
/// document.
pub fn module_operation_key(document_name: &str) -> StorageKey {
    format!("__module_operation_{document_name}")
}
