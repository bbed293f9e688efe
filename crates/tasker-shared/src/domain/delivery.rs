use crate::ids::{DeliveryId, SchemaId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{id, version, name, payload:json, schemaId?}` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub version: u32,
    pub name: String,
    pub payload: Value,
    pub schema_id: Option<SchemaId>,
}
