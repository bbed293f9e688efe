//! Orchestration Cache Model builder (C3, §4.3).
//!
//! One document per `orchestratedFlowId`, built once by the Scheduler
//! at flow start (§4.4 step 1) and read thereafter by every C5/C6
//! invocation as an immutable snapshot.

use tasker_shared::cache::CacheGateway;
use tasker_shared::config::OrchestrationDataCacheConfig;
use tasker_shared::domain::{Assignment, OrchestrationCacheModel, Processor, Step};
use tasker_shared::errors::TaskerError;
use tasker_shared::ids::{OrchestratedFlowId, StepId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// The inputs resolved from the (out-of-scope, §1) entity managers
/// needed to build a flow's [`OrchestrationCacheModel`] (§4.4 step 1).
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    pub steps: Vec<Step>,
    pub assignments: HashMap<StepId, Vec<Assignment>>,
    pub processors: HashMap<StepId, Processor>,
}

/// Builds and persists the [`OrchestrationCacheModel`] for a flow start,
/// and loads it back for C5/C6 (§4.3's "strict precondition": absent
/// ⇒ `OrchestrationModelMissing`, fatal, no retry).
#[derive(Debug, Clone)]
pub struct ModelStore {
    cache: Arc<dyn CacheGateway>,
    config: OrchestrationDataCacheConfig,
}

impl ModelStore {
    pub fn new(cache: Arc<dyn CacheGateway>, config: OrchestrationDataCacheConfig) -> Self {
        Self { cache, config }
    }

    pub async fn build_and_store(
        &self,
        flow_id: OrchestratedFlowId,
        definition: FlowDefinition,
    ) -> Result<OrchestrationCacheModel, TaskerError> {
        let model = OrchestrationCacheModel {
            step_entities: definition
                .steps
                .into_iter()
                .map(|step| (step.id, step))
                .collect(),
            assignments: definition.assignments,
            processors: definition.processors,
            built_at: chrono::Utc::now().timestamp_millis(),
            version: 1,
            cancelled: false,
        };
        self.store(flow_id, &model).await?;
        Ok(model)
    }

    pub async fn store(
        &self,
        flow_id: OrchestratedFlowId,
        model: &OrchestrationCacheModel,
    ) -> Result<(), TaskerError> {
        let bytes = serde_json::to_vec(model)?;
        self.cache
            .set(
                &self.config.map_name,
                &flow_id.to_string(),
                bytes,
                Some(Duration::from_secs(self.config.model_ttl_seconds)),
            )
            .await
            .map_err(TaskerError::from)
    }

    /// Load the model for `flow_id`, or fail with
    /// [`TaskerError::OrchestrationModelMissing`] (§4.3, §8 invariant 4:
    /// never produces a fan-out, never deletes a source blob).
    pub async fn load(
        &self,
        flow_id: OrchestratedFlowId,
    ) -> Result<OrchestrationCacheModel, TaskerError> {
        let bytes = self
            .cache
            .get(&self.config.map_name, &flow_id.to_string())
            .await?
            .ok_or_else(|| TaskerError::OrchestrationModelMissing(flow_id.to_string()))?;
        serde_json::from_slice(&bytes).map_err(TaskerError::from)
    }

    /// Mark a flow cancelled (§5, §9 "Cancellation tombstone"); read by
    /// C5/C6 immediately before fan-out. Requires the model to already
    /// exist.
    pub async fn mark_cancelled(&self, flow_id: OrchestratedFlowId) -> Result<(), TaskerError> {
        let mut model = self.load(flow_id).await?;
        model.cancelled = true;
        self.store(flow_id, &model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_shared::cache::InMemoryCache;
    use tasker_shared::domain::EntryCondition;
    use tasker_shared::ids::ProcessorId;

    fn store() -> ModelStore {
        ModelStore::new(
            Arc::new(InMemoryCache::new()),
            OrchestrationDataCacheConfig::default(),
        )
    }

    #[tokio::test]
    async fn load_fails_with_model_missing_when_never_built() {
        let store = store();
        let err = store.load(OrchestratedFlowId::new()).await.unwrap_err();
        assert!(matches!(err, TaskerError::OrchestrationModelMissing(_)));
    }

    #[tokio::test]
    async fn build_and_load_round_trips() {
        let store = store();
        let flow_id = OrchestratedFlowId::new();
        let step_id = StepId::new();
        let step = Step {
            id: step_id,
            processor_id: ProcessorId::new(),
            next_step_ids: vec![],
            entry_condition: EntryCondition::Always,
        };
        let definition = FlowDefinition {
            steps: vec![step],
            assignments: HashMap::new(),
            processors: HashMap::new(),
        };
        store.build_and_store(flow_id, definition).await.unwrap();
        let loaded = store.load(flow_id).await.unwrap();
        assert!(loaded.step(&step_id).is_some());
        assert!(!loaded.cancelled);
    }

    #[tokio::test]
    async fn mark_cancelled_is_visible_on_reload() {
        let store = store();
        let flow_id = OrchestratedFlowId::new();
        store
            .build_and_store(
                flow_id,
                FlowDefinition {
                    steps: vec![],
                    assignments: HashMap::new(),
                    processors: HashMap::new(),
                },
            )
            .await
            .unwrap();
        store.mark_cancelled(flow_id).await.unwrap();
        assert!(store.load(flow_id).await.unwrap().cancelled);
    }
}
