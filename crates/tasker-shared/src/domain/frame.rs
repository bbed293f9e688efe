use crate::ids::{CorrelationId, ExecutionId, OrchestratedFlowId, ProcessorId, PublishId, StepId, WorkflowId};
use serde::{Deserialize, Serialize};

/// The six-ID hierarchical identity carried by every log, metric, and
/// cache key (§3 "ExecutionFrame", glossary "Execution frame").
///
/// Despite the name, seven fields are present: `execution_id` is
/// distinct from the six identifying *layers* (`orchestrated_flow`,
/// `workflow`, `correlation`, `step`, `processor`, `publish`) — see the
/// glossary definition, which lists `execution` as the `+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFrame {
    pub orchestrated_flow_id: OrchestratedFlowId,
    pub workflow_id: WorkflowId,
    pub correlation_id: CorrelationId,
    pub step_id: StepId,
    pub processor_id: ProcessorId,
    pub publish_id: PublishId,
    pub execution_id: ExecutionId,
}

impl ExecutionFrame {
    /// Derive the frame for a downstream step within the same
    /// execution, bound to a fresh `publish_id` (§4.5 step 5.3).
    pub fn for_next_step(
        &self,
        step_id: StepId,
        processor_id: ProcessorId,
        publish_id: PublishId,
    ) -> Self {
        Self {
            step_id,
            processor_id,
            publish_id,
            ..*self
        }
    }
}
