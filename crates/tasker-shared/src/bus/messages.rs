use crate::domain::{Assignment, ExecutionFrame};
use crate::ids::{CorrelationId, ExecutionId, OrchestratedFlowId, ProcessorId, PublishId, StepId, WorkflowId};
use serde::{Deserialize, Serialize};

/// Consumed by the processor bound by `(processor.version, processor.name)`
/// (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteActivityCommand {
    pub processor_id: ProcessorId,
    pub orchestrated_flow_id: OrchestratedFlowId,
    pub workflow_id: WorkflowId,
    pub correlation_id: CorrelationId,
    pub step_id: StepId,
    pub execution_id: ExecutionId,
    pub publish_id: PublishId,
    pub entities: Vec<Assignment>,
}

impl ExecuteActivityCommand {
    pub fn frame(&self) -> ExecutionFrame {
        ExecutionFrame {
            orchestrated_flow_id: self.orchestrated_flow_id,
            workflow_id: self.workflow_id,
            correlation_id: self.correlation_id,
            step_id: self.step_id,
            processor_id: self.processor_id,
            publish_id: self.publish_id,
            execution_id: self.execution_id,
        }
    }
}

/// §6: `ActivityExecutedEvent { ...frame, status, duration, resultDataSize, entitiesProcessed }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityExecutedEvent {
    pub frame: ExecutionFrame,
    pub status: crate::domain::ActivityStatus,
    pub duration_ms: u64,
    pub result_data_size: u64,
    pub entities_processed: u32,
}

/// §6: `ActivityFailedEvent { ...frame, duration, errorMessage, exceptionType?, stackTrace?, isValidationFailure }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFailedEvent {
    pub frame: ExecutionFrame,
    pub duration_ms: u64,
    pub error_message: String,
    pub exception_type: Option<String>,
    pub stack_trace: Option<String>,
    pub is_validation_failure: bool,
}

/// One of the three inbound triggers the Scheduler admits (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartOrchestratedFlowCommand {
    pub orchestrated_flow_id: OrchestratedFlowId,
    pub correlation_id: Option<CorrelationId>,
}

/// Out-of-band cancellation trigger (§5 "Cancellation").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrchestratedFlowCommand {
    pub orchestrated_flow_id: OrchestratedFlowId,
}
