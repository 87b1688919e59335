/// Unique record identity (server-assigned or client-generated).
/// Examples: `4`, `client:root`, `client:root:viewer`
pub type DataId = String;
/// Storage key derived from a field name plus its applied arguments.
/// Examples: `name`, `friends(first:10)`, `__profile_viewer`
pub type StorageKey = String;
/// Concrete type name stored on a record.
/// Examples: `User`, `Query`, `__TypeSchema`
pub type TypeName = String;
/// One segment of a response path (response key or stringified list index).
/// Examples: `node`, `friends`, `0`
pub type PathSegment = String;
/// Variable name referenced by conditions and arguments.
/// Examples: `enableDefer`, `count`
pub type VariableName = String;

/// Variable bindings supplied alongside a compiled selection tree.
pub type Variables = std::collections::HashMap<VariableName, serde_json::Value>;

/// Reserved storage key exposing a record's concrete type name.
pub const TYPENAME_KEY: &str = "__typename";
