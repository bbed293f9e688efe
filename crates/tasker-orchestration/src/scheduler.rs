//! Scheduler (C4, §4.4).
//!
//! Admits three kinds of triggers: an explicit start command off the
//! bus, a periodic timer (an in-memory job store, no cross-restart
//! persistence required), and an external caller hitting the HTTP
//! start API (wired in `bin/server.rs`). All three converge on
//! [`Scheduler::start_flow`].

use std::collections::HashMap;
use std::sync::Arc;

use tasker_shared::bus::{BusGateway, ExecuteActivityCommand};
use tasker_shared::domain::{OrchestratedFlow, Processor, Step};
use tasker_shared::errors::TaskerError;
use tasker_shared::ids::{CorrelationId, ExecutionId, OrchestratedFlowId, StepId, WorkflowId};

use crate::health::HealthMonitor;
use crate::model::{FlowDefinition, ModelStore};

/// Resolves the entities a flow start needs from the (out-of-scope,
/// §1) entity managers. Kept as a trait so `bin/server.rs` can bind a
/// real HTTP-backed resolver while tests use an in-memory one.
#[async_trait::async_trait]
pub trait FlowResolver: Send + Sync + std::fmt::Debug {
    async fn resolve(
        &self,
        orchestrated_flow_id: OrchestratedFlowId,
    ) -> Result<ResolvedFlow, TaskerError>;
}

/// Everything C4 step 1 needs: the flow's own record, its workflow id,
/// and the fully-joined step/assignment/processor graph.
#[derive(Debug, Clone)]
pub struct ResolvedFlow {
    pub flow: OrchestratedFlow,
    pub workflow_id: WorkflowId,
    pub definition: FlowDefinition,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    bus: Arc<dyn BusGateway>,
    model_store: ModelStore,
    resolver: Arc<dyn FlowResolver>,
    health: HealthMonitor,
}

impl Scheduler {
    pub fn new(
        bus: Arc<dyn BusGateway>,
        model_store: ModelStore,
        resolver: Arc<dyn FlowResolver>,
        health: HealthMonitor,
    ) -> Self {
        Self {
            bus,
            model_store,
            resolver,
            health,
        }
    }

    /// §4.4's procedure, steps 1-3. `correlation_id` comes from the
    /// trigger if supplied, otherwise a fresh one is minted.
    pub async fn start_flow(
        &self,
        orchestrated_flow_id: OrchestratedFlowId,
        correlation_id: Option<CorrelationId>,
    ) -> Result<ExecutionId, TaskerError> {
        let resolved = self.resolver.resolve(orchestrated_flow_id).await?;

        let unhealthy = self.unhealthy_target_processors(&resolved.definition).await?;
        if let Some(processor) = unhealthy.first() {
            return Err(TaskerError::ValidationFailure(format!(
                "target processor {}@v{} is unhealthy, refusing to start flow",
                processor.name, processor.version
            )));
        }

        // Step 1: build and persist the orchestration model.
        self.model_store
            .build_and_store(orchestrated_flow_id, resolved.definition.clone())
            .await?;

        // Step 2: emit one ExecuteActivityCommand per entry step.
        let correlation_id = correlation_id.unwrap_or_else(CorrelationId::new);
        let execution_id = ExecutionId::new();
        let entry_steps = entry_steps(&resolved.definition.steps);

        for step in &entry_steps {
            let Some(processor) = resolved.definition.processors.get(&step.id) else {
                continue;
            };
            let command = ExecuteActivityCommand {
                processor_id: processor.id,
                orchestrated_flow_id,
                workflow_id: resolved.workflow_id,
                correlation_id,
                step_id: step.id,
                execution_id,
                publish_id: tasker_shared::ids::PublishId::sentinel(),
                entities: resolved
                    .definition
                    .assignments
                    .get(&step.id)
                    .cloned()
                    .unwrap_or_default(),
            };
            let queue = tasker_shared::bus::processor_queue_name(&processor.key());
            self.bus.publish_command(&queue, command).await?;
        }

        // Step 3: flow-started metric.
        tracing::info!(
            orchestrated_flow_id = %orchestrated_flow_id,
            correlation_id = %correlation_id,
            execution_id = %execution_id,
            entry_step_count = entry_steps.len(),
            "flow started"
        );

        Ok(execution_id)
    }

    async fn unhealthy_target_processors<'a>(
        &self,
        definition: &'a FlowDefinition,
    ) -> Result<Vec<&'a Processor>, TaskerError> {
        let mut unhealthy = Vec::new();
        for processor in definition.processors.values() {
            if !self.health.is_healthy(&processor.key()).await? {
                unhealthy.push(processor);
            }
        }
        Ok(unhealthy)
    }
}

/// An entry step is one never referenced as a `nextStepIds` member of
/// any other step in the workflow (§4.4 step 2).
pub fn entry_steps(steps: &[Step]) -> Vec<Step> {
    let mut referenced: HashMap<StepId, ()> = HashMap::new();
    for step in steps {
        for next in &step.next_step_ids {
            referenced.insert(*next, ());
        }
    }
    steps
        .iter()
        .filter(|step| !referenced.contains_key(&step.id))
        .cloned()
        .collect()
}
