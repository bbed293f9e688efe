//! Breaking-change schema diff for the Tasker entity managers (§4.7).
//!
//! This crate has one job: given the `before` and `after`
//! `Schema.definition` of a proposed `PUT`, decide whether the update
//! is backward compatible. The (out-of-scope) `Schema` entity manager
//! is expected to call [`schema_diff::diff_schema`] before accepting a
//! write and return 409 with [`BreakingChangeReport::breaking_reason`]
//! when it isn't.

pub mod schema_diff;

pub use schema_diff::{diff_schema, BreakingChangeReport, Compatibility, DiffFinding};

use tasker_shared::domain::Schema;

/// Convenience wrapper over [`diff_schema`] for callers holding the two
/// `Schema` entity versions directly, rather than their bare
/// `definition` documents.
pub fn diff_schema_versions(before: &Schema, after: &Schema) -> BreakingChangeReport {
    diff_schema(&before.definition, &after.definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_shared::ids::SchemaId;

    #[test]
    fn diff_schema_versions_delegates_to_definitions() {
        let before = Schema {
            id: SchemaId::new(),
            version: 1,
            name: "order-created".to_string(),
            definition: serde_json::json!({ "type": "object", "properties": {} }),
        };
        let mut after = before.clone();
        after.version = 2;
        after.definition = serde_json::json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });

        let report = diff_schema_versions(&before, &after);
        assert!(report.is_breaking());
    }
}
