use crate::ids::{ProcessorId, SchemaId};
use serde::{Deserialize, Serialize};

/// `{id, version, name, inputSchemaId, outputSchemaId}` (§3).
///
/// Composite key is `(version, name)` — this is also the address a
/// Bus Gateway consumer binds to (§4.2): every instance of the same
/// `(version, name)` cooperates on one queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processor {
    pub id: ProcessorId,
    pub version: u32,
    pub name: String,
    pub input_schema_id: SchemaId,
    pub output_schema_id: SchemaId,
}

/// `(version, name)` composite key a Bus Gateway consumer binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorKey {
    pub version: u32,
    pub name: String,
}

impl Processor {
    pub fn key(&self) -> ProcessorKey {
        ProcessorKey {
            version: self.version,
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Display for ProcessorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@v{}", self.name, self.version)
    }
}
