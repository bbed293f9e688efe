use crate::ids::SchemaId;
use serde::{Deserialize, Serialize};

/// `{assemblyBasePath, assemblyName, assemblyVersion, typeName, ...}` (§3).
///
/// Attached to an [`crate::domain::Assignment::Plugin`] variant. Dynamic
/// loading of `(assembly_base_path, type_name, version)` is out of scope
/// (§1, §9): the processor runtime receives this descriptor and owns
/// resolution, isolation, and timeout enforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub assembly_base_path: String,
    pub assembly_name: String,
    pub assembly_version: String,
    pub type_name: String,
    pub input_schema_id: Option<SchemaId>,
    pub output_schema_id: Option<SchemaId>,
    pub enable_input_validation: bool,
    pub enable_output_validation: bool,
    pub execution_timeout_ms: u64,
    pub is_stateless: bool,
}
