use crate::ids::SchemaId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{id, version, name, definition:json-schema}` (§3).
///
/// Immutable once referenced: `tasker-sdk`'s breaking-change analysis
/// (§4.7) is the gate a manager consults before accepting a `PUT` that
/// would change `definition` for a schema any `Address`/`Delivery`/
/// `Processor`/`Plugin` already points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: SchemaId,
    pub version: u32,
    pub name: String,
    pub definition: Value,
}
