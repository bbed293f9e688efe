//! Input/output JSON Schema validation (§4.6 steps 2/4, §6
//! `SchemaValidation.Enable{Input,Output}Validation`).

use async_trait::async_trait;
use serde_json::Value;
use tasker_shared::config::ManagerUrlsConfig;
use tasker_shared::domain::Schema;
use tasker_shared::errors::TaskerError;
use tasker_shared::ids::SchemaId;

/// Resolves a `SchemaId` to the `Schema` entity's `definition`, bound to
/// the (out-of-scope) schema manager the same way
/// `tasker-orchestration::HttpFlowResolver` binds to the flow/step
/// managers.
#[async_trait]
pub trait SchemaResolver: Send + Sync {
    async fn resolve(&self, schema_id: SchemaId) -> Result<Schema, TaskerError>;
}

/// §7 `ValidatorUnavailable` — 503, fail-safe reject: a schema that
/// can't be fetched is treated as a validator outage, not a pass.
#[derive(Debug)]
pub struct HttpSchemaResolver {
    client: reqwest::Client,
    manager_urls: ManagerUrlsConfig,
}

impl HttpSchemaResolver {
    pub fn new(manager_urls: ManagerUrlsConfig) -> Self {
        Self { client: reqwest::Client::new(), manager_urls }
    }
}

#[async_trait]
impl SchemaResolver for HttpSchemaResolver {
    async fn resolve(&self, schema_id: SchemaId) -> Result<Schema, TaskerError> {
        let base = self
            .manager_urls
            .url_for("Schema")
            .ok_or(TaskerError::ValidatorUnavailable)?;
        let response = self
            .client
            .get(format!("{base}/api/schema/{schema_id}"))
            .send()
            .await
            .map_err(|_| TaskerError::ValidatorUnavailable)?;
        if !response.status().is_success() {
            return Err(TaskerError::ValidatorUnavailable);
        }
        response
            .json::<Schema>()
            .await
            .map_err(|_| TaskerError::ValidatorUnavailable)
    }
}

/// Validate `value` against `definition` (§4.6 steps 2/4).
///
/// An unparseable schema document is itself a `ValidatorUnavailable`
/// (mirrors §4.7's "unparseable schemas are treated as breaking" for
/// the sibling diff procedure) rather than a `ValidationFailure`: the
/// fault is in the schema, not the payload under test.
pub fn validate(definition: &Value, value: &Value) -> Result<(), TaskerError> {
    let validator =
        jsonschema::validator_for(definition).map_err(|_| TaskerError::ValidatorUnavailable)?;
    let errors: Vec<String> = validator.iter_errors(value).map(|err| err.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TaskerError::ValidationFailure(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_accepts_a_conforming_document() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "a" })).is_ok());
    }

    #[test]
    fn validate_rejects_a_missing_required_field() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        let err = validate(&schema, &json!({})).unwrap_err();
        assert!(matches!(err, TaskerError::ValidationFailure(_)));
    }

    #[test]
    fn validate_treats_an_unparseable_schema_as_validator_unavailable() {
        let schema = json!({ "type": "not-a-real-type" });
        let err = validate(&schema, &json!({})).unwrap_err();
        assert!(matches!(err, TaskerError::ValidatorUnavailable));
    }
}
