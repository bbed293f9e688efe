//! Breaking-change analysis (§4.7) — the collaborator a `Schema`
//! manager consults before accepting a `PUT` that would change
//! `definition` for a schema any `Address`/`Delivery`/`Processor`/
//! `Plugin` already references (§3 "Immutable definition once
//! referenced").
//!
//! Grounded on the corpus's own temporal schema diff
//! (`tasker-sdk::schema_diff`, which compares `TaskTemplate` versions)
//! and its sibling `tasker-tooling::schema_comparator` (which compares
//! producer/consumer schemas within one template): both walk two JSON
//! Schema `properties` maps field-by-field and report per-field
//! findings tagged with a machine-readable code and a breaking flag.
//! This module applies the same shape directly to two versions of one
//! `Schema.definition`, per the exact rule list in §4.7.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

/// Overall verdict for a schema update (§4.7, §6 "409 ... breaking
/// schema change").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    Compatible,
    CompatibleWithWarnings,
    Incompatible,
}

/// A single diff finding for one field (or the schema as a whole).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffFinding {
    pub code: String,
    pub breaking: bool,
    /// Dotted field path; empty for schema-level findings.
    pub field_path: String,
    pub message: String,
}

/// Complete report for one `Schema.definition` update.
#[derive(Debug, Clone, Serialize)]
pub struct BreakingChangeReport {
    pub compatibility: Compatibility,
    pub findings: Vec<DiffFinding>,
}

impl BreakingChangeReport {
    /// Whether a `PUT` carrying this diff should be rejected with 409
    /// (§6 "PUT with breaking schema change: 409").
    pub fn is_breaking(&self) -> bool {
        self.compatibility == Compatibility::Incompatible
    }

    /// The first breaking finding's message, for a 409 response body
    /// (§8 scenario 6 wants the literal finding text surfaced).
    pub fn breaking_reason(&self) -> Option<&str> {
        self.findings
            .iter()
            .find(|f| f.breaking)
            .map(|f| f.message.as_str())
    }
}

/// Compare `before` and `after` versions of a `Schema.definition`
/// (§4.7). Unparseable input (not a JSON object, or missing/invalid
/// `type`) is conservatively treated as breaking (§8 invariant 6).
pub fn diff_schema(before: &Value, after: &Value) -> BreakingChangeReport {
    if !is_parseable_schema(before) || !is_parseable_schema(after) {
        return BreakingChangeReport {
            compatibility: Compatibility::Incompatible,
            findings: vec![DiffFinding {
                code: "UNPARSEABLE_SCHEMA".to_string(),
                breaking: true,
                field_path: String::new(),
                message: "schema document is unparseable, treated as breaking".to_string(),
            }],
        };
    }

    let mut findings = Vec::new();
    diff_object_level(before, after, "", &mut findings);

    let compatibility = if findings.iter().any(|f| f.breaking) {
        Compatibility::Incompatible
    } else if findings.is_empty() {
        Compatibility::Compatible
    } else {
        Compatibility::CompatibleWithWarnings
    };

    BreakingChangeReport {
        compatibility,
        findings,
    }
}

/// A schema document is parseable here if it's a JSON object and, when
/// it declares a `type`, that `type` is one of the seven JSON Schema
/// primitives. Anything else (a bare string, a `type` that isn't a
/// recognised primitive, ...) can't be diffed meaningfully.
fn is_parseable_schema(value: &Value) -> bool {
    const PRIMITIVES: &[&str] = &[
        "object", "array", "string", "number", "integer", "boolean", "null",
    ];
    let Some(object) = value.as_object() else {
        return false;
    };
    match object.get("type") {
        None => true,
        Some(Value::String(t)) => PRIMITIVES.contains(&t.as_str()),
        Some(_) => false,
    }
}

fn diff_object_level(before: &Value, after: &Value, prefix: &str, findings: &mut Vec<DiffFinding>) {
    diff_additional_properties(before, after, prefix, findings);
    diff_bounds(before, after, prefix, findings);

    let before_props = before.get("properties").and_then(Value::as_object);
    let after_props = after.get("properties").and_then(Value::as_object);

    let before_required: HashSet<&str> = string_set(before.get("required"));
    let after_required: HashSet<&str> = string_set(after.get("required"));

    let mut field_names: Vec<&str> = before_props
        .iter()
        .flat_map(|p| p.keys().map(String::as_str))
        .chain(after_props.iter().flat_map(|p| p.keys().map(String::as_str)))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    field_names.sort_unstable();

    for field in field_names {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        let before_field = before_props.and_then(|p| p.get(field));
        let after_field = after_props.and_then(|p| p.get(field));
        let was_required = before_required.contains(field);
        let is_required = after_required.contains(field);

        match (before_field, after_field) {
            (Some(_), None) => {
                // §4.7 "a property is removed" — always breaking. The
                // §8 scenario-6 wording is reproduced verbatim for the
                // required case.
                findings.push(DiffFinding {
                    code: "PROPERTY_REMOVED".to_string(),
                    breaking: true,
                    field_path: path.clone(),
                    message: if was_required {
                        format!("Required field removed: '{field}'")
                    } else {
                        format!("Field removed: '{field}'")
                    },
                });
            }
            (None, Some(_)) => {
                // §4.7 "a required field is added" is breaking; an
                // optional addition is backward-compatible.
                findings.push(DiffFinding {
                    code: "PROPERTY_ADDED".to_string(),
                    breaking: is_required,
                    field_path: path.clone(),
                    message: if is_required {
                        format!("Required field added: '{field}'")
                    } else {
                        format!("Field added: '{field}'")
                    },
                });
            }
            (Some(bf), Some(af)) => {
                diff_type(bf, af, &path, findings);
                diff_additional_properties(bf, af, &path, findings);
                diff_bounds(bf, af, &path, findings);

                if was_required && !is_required {
                    // §4.7 "a required field is ... removed" — read as
                    // the required-ness being removed, not only the
                    // property. Deliberately stricter than a
                    // widening-is-safe reading; recorded in DESIGN.md.
                    findings.push(DiffFinding {
                        code: "REQUIRED_TO_OPTIONAL".to_string(),
                        breaking: true,
                        field_path: path.clone(),
                        message: format!("Field '{field}' is no longer required"),
                    });
                } else if !was_required && is_required {
                    findings.push(DiffFinding {
                        code: "OPTIONAL_TO_REQUIRED".to_string(),
                        breaking: true,
                        field_path: path.clone(),
                        message: format!("Field '{field}' became required"),
                    });
                }

                let both_objects = bf.get("type").and_then(Value::as_str) == Some("object")
                    && af.get("type").and_then(Value::as_str) == Some("object");
                if both_objects {
                    diff_object_level(bf, af, &path, findings);
                }
            }
            (None, None) => unreachable!(),
        }
    }
}

/// §4.7 "a property's declared type is incompatible with its
/// predecessor (only `integer → number` is compatible)".
fn diff_type(before: &Value, after: &Value, path: &str, findings: &mut Vec<DiffFinding>) {
    let (Some(before_type), Some(after_type)) = (
        before.get("type").and_then(Value::as_str),
        after.get("type").and_then(Value::as_str),
    ) else {
        return;
    };
    if before_type == after_type {
        return;
    }
    let compatible = before_type == "integer" && after_type == "number";
    findings.push(DiffFinding {
        code: "TYPE_CHANGED".to_string(),
        breaking: !compatible,
        field_path: path.to_string(),
        message: format!("type changed from '{before_type}' to '{after_type}'"),
    });
}

/// §4.7 "stricter validation rules are introduced" for the
/// `additionalProperties` switch: `true`/absent (open) tightening to
/// `false` (closed) rejects documents the predecessor schema accepted.
fn diff_additional_properties(
    before: &Value,
    after: &Value,
    path: &str,
    findings: &mut Vec<DiffFinding>,
) {
    let before_open = before
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let after_open = after
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    if before_open && !after_open {
        findings.push(DiffFinding {
            code: "STRICTER_VALIDATION".to_string(),
            breaking: true,
            field_path: path.to_string(),
            message: "additionalProperties tightened from open to false".to_string(),
        });
    }
}

/// §4.7 "stricter validation rules are introduced" for numeric/string
/// bounds: a narrower `minimum`/`minLength`/`pattern`/`enum` rejects
/// documents the predecessor accepted.
fn diff_bounds(before: &Value, after: &Value, path: &str, findings: &mut Vec<DiffFinding>) {
    tightened_lower_bound(before, after, "minimum", path, findings);
    tightened_lower_bound(before, after, "minLength", path, findings);
    tightened_lower_bound(before, after, "minItems", path, findings);
    tightened_upper_bound(before, after, "maximum", path, findings);
    tightened_upper_bound(before, after, "maxLength", path, findings);
    tightened_upper_bound(before, after, "maxItems", path, findings);

    if before.get("pattern").is_none() && after.get("pattern").is_some() {
        findings.push(DiffFinding {
            code: "STRICTER_VALIDATION".to_string(),
            breaking: true,
            field_path: path.to_string(),
            message: "a new 'pattern' constraint was introduced".to_string(),
        });
    }

    if let (Some(before_enum), Some(after_enum)) = (
        before.get("enum").and_then(Value::as_array),
        after.get("enum").and_then(Value::as_array),
    ) {
        let before_set: HashSet<&Value> = before_enum.iter().collect();
        let after_set: HashSet<&Value> = after_enum.iter().collect();
        if !before_set.is_subset(&after_set) {
            findings.push(DiffFinding {
                code: "STRICTER_VALIDATION".to_string(),
                breaking: true,
                field_path: path.to_string(),
                message: "'enum' narrowed, removing previously valid values".to_string(),
            });
        }
    }
}

fn tightened_lower_bound(
    before: &Value,
    after: &Value,
    key: &str,
    path: &str,
    findings: &mut Vec<DiffFinding>,
) {
    if let (Some(b), Some(a)) = (
        before.get(key).and_then(Value::as_f64),
        after.get(key).and_then(Value::as_f64),
    ) {
        if a > b {
            findings.push(DiffFinding {
                code: "STRICTER_VALIDATION".to_string(),
                breaking: true,
                field_path: path.to_string(),
                message: format!("'{key}' tightened from {b} to {a}"),
            });
        }
    }
}

fn tightened_upper_bound(
    before: &Value,
    after: &Value,
    key: &str,
    path: &str,
    findings: &mut Vec<DiffFinding>,
) {
    if let (Some(b), Some(a)) = (
        before.get(key).and_then(Value::as_f64),
        after.get(key).and_then(Value::as_f64),
    ) {
        if a < b {
            findings.push(DiffFinding {
                code: "STRICTER_VALIDATION".to_string(),
                breaking: true,
                field_path: path.to_string(),
                message: format!("'{key}' tightened from {b} to {a}"),
            });
        }
    }
}

fn string_set(value: Option<&Value>) -> HashSet<&str> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_schemas_are_compatible() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });
        let report = diff_schema(&schema, &schema);
        assert_eq!(report.compatibility, Compatibility::Compatible);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn removing_a_required_field_is_breaking_with_the_literal_message() {
        let before = json!({
            "type": "object",
            "required": ["x"],
            "properties": { "x": { "type": "string" } }
        });
        let after = json!({ "type": "object", "properties": {} });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
        assert_eq!(
            report.breaking_reason(),
            Some("Required field removed: 'x'")
        );
    }

    #[test]
    fn removing_an_optional_property_is_breaking_per_section_4_7() {
        let before = json!({
            "type": "object",
            "properties": { "debug": { "type": "string" } }
        });
        let after = json!({ "type": "object", "properties": {} });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }

    #[test]
    fn adding_an_optional_field_is_compatible_with_warnings() {
        let before = json!({ "type": "object", "properties": { "id": { "type": "string" } } });
        let after = json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" }
            }
        });
        let report = diff_schema(&before, &after);
        assert_eq!(report.compatibility, Compatibility::CompatibleWithWarnings);
    }

    #[test]
    fn adding_a_new_required_field_is_breaking() {
        let before = json!({ "type": "object", "properties": { "id": { "type": "string" } } });
        let after = json!({
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" }
            }
        });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
        assert!(report
            .findings
            .iter()
            .any(|f| f.code == "PROPERTY_ADDED" && f.breaking));
    }

    #[test]
    fn integer_to_number_is_the_sole_compatible_type_change() {
        let before = json!({ "type": "object", "properties": { "count": { "type": "integer" } } });
        let after = json!({ "type": "object", "properties": { "count": { "type": "number" } } });
        let report = diff_schema(&before, &after);
        assert_eq!(report.compatibility, Compatibility::CompatibleWithWarnings);
        assert!(report
            .findings
            .iter()
            .any(|f| f.code == "TYPE_CHANGED" && !f.breaking));
    }

    #[test]
    fn every_other_type_change_is_breaking() {
        let before = json!({ "type": "object", "properties": { "count": { "type": "string" } } });
        let after = json!({ "type": "object", "properties": { "count": { "type": "integer" } } });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }

    #[test]
    fn tightening_additional_properties_is_breaking() {
        let before = json!({ "type": "object", "properties": {} });
        let after = json!({ "type": "object", "properties": {}, "additionalProperties": false });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }

    #[test]
    fn raising_a_minimum_bound_is_breaking() {
        let before = json!({ "type": "object", "properties": { "age": { "type": "integer", "minimum": 0 } } });
        let after = json!({ "type": "object", "properties": { "age": { "type": "integer", "minimum": 18 } } });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }

    #[test]
    fn lowering_a_minimum_bound_is_not_breaking() {
        let before = json!({ "type": "object", "properties": { "age": { "type": "integer", "minimum": 18 } } });
        let after = json!({ "type": "object", "properties": { "age": { "type": "integer", "minimum": 0 } } });
        let report = diff_schema(&before, &after);
        assert!(!report.is_breaking());
    }

    #[test]
    fn narrowing_an_enum_is_breaking() {
        let before = json!({ "type": "object", "properties": { "state": { "type": "string", "enum": ["a", "b"] } } });
        let after = json!({ "type": "object", "properties": { "state": { "type": "string", "enum": ["a"] } } });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }

    #[test]
    fn widening_an_enum_is_compatible() {
        let before = json!({ "type": "object", "properties": { "state": { "type": "string", "enum": ["a"] } } });
        let after = json!({ "type": "object", "properties": { "state": { "type": "string", "enum": ["a", "b"] } } });
        let report = diff_schema(&before, &after);
        assert_eq!(report.compatibility, Compatibility::Compatible);
    }

    #[test]
    fn required_to_optional_is_breaking_per_literal_section_4_7_reading() {
        let before = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });
        let after = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } }
        });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
        assert!(report
            .findings
            .iter()
            .any(|f| f.code == "REQUIRED_TO_OPTIONAL"));
    }

    #[test]
    fn nested_object_changes_are_detected() {
        let before = json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": "object",
                    "required": ["source"],
                    "properties": { "source": { "type": "string" } }
                }
            }
        });
        let after = json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": "object",
                    "properties": {}
                }
            }
        });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
        assert!(report
            .findings
            .iter()
            .any(|f| f.field_path == "metadata.source"));
    }

    #[test]
    fn unparseable_schema_is_conservatively_breaking() {
        let before = json!({ "type": "object", "properties": {} });
        let after = json!({ "type": "not-a-real-type" });
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
        assert_eq!(report.findings[0].code, "UNPARSEABLE_SCHEMA");
    }

    #[test]
    fn non_object_document_is_unparseable() {
        let before = json!({ "type": "object", "properties": {} });
        let after = json!("not a schema");
        let report = diff_schema(&before, &after);
        assert!(report.is_breaking());
    }
}
