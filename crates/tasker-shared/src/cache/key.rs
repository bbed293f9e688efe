use crate::ids::{CorrelationId, ExecutionId, OrchestratedFlowId, ProcessorId, PublishId, StepId};
use std::fmt;

/// The fixed key schema for processor-activity-data blobs (§4.1):
///
/// `{processorId}:{orchestratedFlowId}:{correlationId}:{executionId}:{stepId}:{publishId}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityDataKey {
    pub processor_id: ProcessorId,
    pub orchestrated_flow_id: OrchestratedFlowId,
    pub correlation_id: CorrelationId,
    pub execution_id: ExecutionId,
    pub step_id: StepId,
    pub publish_id: PublishId,
}

impl fmt::Display for ActivityDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.processor_id,
            self.orchestrated_flow_id,
            self.correlation_id,
            self.execution_id,
            self.step_id,
            self.publish_id
        )
    }
}

/// Key for the file-registration deduplication map used by one external
/// plugin (§5 "Shared resources") — not consulted by the core consumers,
/// but typed here since it shares the `PutIfAbsent` contract of C1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRegistrationKey(pub String);

impl fmt::Display for FileRegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-registration:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_data_key_formats_in_fixed_field_order() {
        let key = ActivityDataKey {
            processor_id: ProcessorId::nil(),
            orchestrated_flow_id: OrchestratedFlowId::nil(),
            correlation_id: CorrelationId::nil(),
            execution_id: ExecutionId::nil(),
            step_id: StepId::nil(),
            publish_id: PublishId::sentinel(),
        };
        let nil = "00000000-0000-0000-0000-000000000000";
        assert_eq!(
            key.to_string(),
            format!("{nil}:{nil}:{nil}:{nil}:{nil}:{nil}")
        );
    }
}
