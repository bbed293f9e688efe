use crate::ids::{AddressId, SchemaId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{id, version, name, connectionString, payload:json, schemaId?}` (§3).
///
/// Composite key is `connectionString` (unique). When `schema_id` is
/// set, `payload` must validate against it — enforced by the external
/// JSON-schema validator (§1), not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub version: u32,
    pub name: String,
    pub connection_string: String,
    pub payload: Value,
    pub schema_id: Option<SchemaId>,
}
