//! Activity-Completion & Failure Consumers (C5, C6, §4.5) — the core.
//!
//! C5 and C6 are near-mirror state machines differing only in which
//! status they observe. Rather than duplicate the body, both are
//! expressed as one call to [`process_terminal_event`] against a
//! [`TerminalEvent`], which already carries the right status (§4.5
//! "Status from event kind").

use futures::future::join_all;
use std::sync::Arc;
use tasker_shared::bus::{
    ActivityExecutedEvent, ActivityFailedEvent, BusGateway, TerminalEvent,
};
use tasker_shared::cache::{ActivityDataKey, CacheGateway};
use tasker_shared::config::{OrchestrationDataCacheConfig, ProcessorActivityDataCacheConfig};
use tasker_shared::domain::{ActivityStatus, ExecutionFrame};
use tasker_shared::errors::TaskerError;
use tasker_shared::ids::PublishId;

use crate::model::ModelStore;

/// Shared dependencies of the terminal-event consume loop.
#[derive(Debug, Clone)]
pub struct Consumer {
    bus: Arc<dyn BusGateway>,
    cache: Arc<dyn CacheGateway>,
    model_store: ModelStore,
    activity_cache: ProcessorActivityDataCacheConfig,
}

impl Consumer {
    pub fn new(
        bus: Arc<dyn BusGateway>,
        cache: Arc<dyn CacheGateway>,
        orchestration_cache_config: OrchestrationDataCacheConfig,
        activity_cache: ProcessorActivityDataCacheConfig,
    ) -> Self {
        Self {
            bus,
            model_store: ModelStore::new(cache.clone(), orchestration_cache_config),
            cache,
            activity_cache,
        }
    }

    /// Poll `queue` for up to `max` terminal events and process each one
    /// (§4.5's algorithm), acking on success and nacking so the bus
    /// redelivers on any error — transient or fatal alike, since a fatal
    /// error here means a downstream graph inconsistency, not a reason
    /// to silently drop the event.
    pub async fn poll_once(&self, queue: &str, max: usize) -> Result<usize, TaskerError> {
        let messages = self.bus.consume_terminal_events(queue, max).await?;
        let mut processed = 0;
        for message in messages {
            let result = self.process_terminal_event(&message.payload).await;
            match result {
                Ok(()) => {
                    self.bus.ack(queue, &message.receipt).await?;
                    processed += 1;
                }
                Err(err) => {
                    tracing::error!(?err, is_redelivery = message.is_redelivery, "terminal event processing failed");
                    self.bus.nack(queue, &message.receipt).await?;
                }
            }
        }
        Ok(processed)
    }

    /// The shared C5/C6 body (§4.5 steps 1-6).
    pub async fn process_terminal_event(&self, event: &TerminalEvent) -> Result<(), TaskerError> {
        let frame = event.frame();
        let status = event.status();

        // Step 1: load model.
        let model = self.model_store.load(frame.orchestrated_flow_id).await?;

        // Step 2: resolve current step.
        let step = model
            .step(&frame.step_id)
            .ok_or_else(|| TaskerError::StepUnknown(frame.step_id.to_string()))?
            .clone();

        // Step 3/4: determine successors, branch termination.
        if step.next_step_ids.is_empty() {
            self.cleanup_source(&frame).await?;
            tracing::info!(
                orchestrated_flow_id = %frame.orchestrated_flow_id,
                step_id = %frame.step_id,
                "branch terminated"
            );
            return Ok(());
        }

        // Step 5: cancellation tombstone checked immediately before fan-out (§5, §9).
        if model.cancelled {
            tracing::info!(
                orchestrated_flow_id = %frame.orchestrated_flow_id,
                "flow cancelled, suppressing fan-out"
            );
            self.cleanup_source(&frame).await?;
            return Ok(());
        }

        let source_key = activity_key(&frame);
        let source_value = self.cache.get(&self.activity_cache.map_name, &source_key.to_string()).await?;

        let edges = join_all(step.next_step_ids.iter().map(|next_id| {
            self.fan_out_edge(&model, frame, status, *next_id, source_value.clone())
        }))
        .await;

        // Step 6: source cleanup, always, regardless of per-edge outcome.
        let cleanup_result = self.cleanup_source(&frame).await;

        let first_edge_err = edges.into_iter().find_map(|r| r.err());
        cleanup_result?;
        if let Some(err) = first_edge_err {
            return Err(err);
        }
        Ok(())
    }

    async fn fan_out_edge(
        &self,
        model: &tasker_shared::domain::OrchestrationCacheModel,
        frame: ExecutionFrame,
        status: ActivityStatus,
        next_step_id: tasker_shared::ids::StepId,
        source_value: Option<Vec<u8>>,
    ) -> Result<(), TaskerError> {
        let Some(next_step) = model.step(&next_step_id) else {
            tracing::warn!(step_id = %next_step_id, "successor step unknown, skipping edge");
            return Ok(());
        };

        if !next_step.entry_condition.is_satisfied_by(status) {
            return Ok(());
        }

        let publish_id = PublishId::new();
        let next_frame = frame.for_next_step(next_step_id, next_step.processor_id, publish_id);

        match &source_value {
            Some(value) => {
                let dest_key = activity_key(&next_frame);
                self.cache
                    .set(
                        &self.activity_cache.map_name,
                        &dest_key.to_string(),
                        value.clone(),
                        Some(std::time::Duration::from_secs(
                            self.activity_cache_ttl_seconds(),
                        )),
                    )
                    .await?;
            }
            None => {
                tracing::warn!(
                    step_id = %frame.step_id,
                    "source activity blob absent, downstream plugin will see empty input"
                );
            }
        }

        let command = tasker_shared::bus::ExecuteActivityCommand {
            processor_id: next_step.processor_id,
            orchestrated_flow_id: next_frame.orchestrated_flow_id,
            workflow_id: next_frame.workflow_id,
            correlation_id: next_frame.correlation_id,
            step_id: next_step_id,
            execution_id: next_frame.execution_id,
            publish_id,
            entities: model.assignments_for(&next_step_id).to_vec(),
        };

        let queue = match model.processor_for(&next_step_id) {
            Some(processor) => tasker_shared::bus::processor_queue_name(&processor.key()),
            None => format!("execute-activity:{}", next_step.processor_id),
        };
        self.bus.publish_command(&queue, command).await?;
        Ok(())
    }

    async fn cleanup_source(&self, frame: &ExecutionFrame) -> Result<(), TaskerError> {
        let key = activity_key(frame);
        self.cache
            .remove(&self.activity_cache.map_name, &key.to_string())
            .await?;
        Ok(())
    }

    fn activity_cache_ttl_seconds(&self) -> u64 {
        900
    }

    /// Derive an [`ActivityExecutedEvent`] for C7's success path (§4.6
    /// step 6), exposed here since the frame-building logic is shared.
    pub fn executed_event(
        frame: ExecutionFrame,
        status: ActivityStatus,
        duration_ms: u64,
        result_data_size: u64,
        entities_processed: u32,
    ) -> ActivityExecutedEvent {
        ActivityExecutedEvent {
            frame,
            status,
            duration_ms,
            result_data_size,
            entities_processed,
        }
    }

    /// Derive an [`ActivityFailedEvent`] for C7's failure path.
    pub fn failed_event(
        frame: ExecutionFrame,
        duration_ms: u64,
        error_message: String,
        exception_type: Option<String>,
        stack_trace: Option<String>,
        is_validation_failure: bool,
    ) -> ActivityFailedEvent {
        ActivityFailedEvent {
            frame,
            duration_ms,
            error_message,
            exception_type,
            stack_trace,
            is_validation_failure,
        }
    }
}

fn activity_key(frame: &ExecutionFrame) -> ActivityDataKey {
    ActivityDataKey {
        processor_id: frame.processor_id,
        orchestrated_flow_id: frame.orchestrated_flow_id,
        correlation_id: frame.correlation_id,
        execution_id: frame.execution_id,
        step_id: frame.step_id,
        publish_id: frame.publish_id,
    }
}
