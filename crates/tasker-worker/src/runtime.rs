//! Processor Runtime (C7, §4.6) — the host-side contract driving one
//! bound `(processor.version, processor.name)` queue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tasker_shared::bus::{ActivityFailedEvent, BusGateway, ACTIVITY_EVENTS_QUEUE};
use tasker_shared::cache::{ActivityDataKey, CacheGateway};
use tasker_shared::config::{ProcessorActivityDataCacheConfig, SchemaValidationConfig};
use tasker_shared::domain::{ActivityStatus, ExecutionFrame};
use tasker_shared::errors::TaskerError;

use crate::plugin::PluginRegistry;
use crate::schema::{validate, SchemaResolver};

/// Shared dependencies of the C7 poll/consume loop (mirrors
/// `tasker_orchestration::Consumer`'s shape).
#[derive(Clone)]
pub struct ProcessorRuntime {
    bus: Arc<dyn BusGateway>,
    cache: Arc<dyn CacheGateway>,
    schemas: Arc<dyn SchemaResolver>,
    plugins: Arc<PluginRegistry>,
    activity_cache: ProcessorActivityDataCacheConfig,
    schema_validation: SchemaValidationConfig,
}

impl std::fmt::Debug for ProcessorRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRuntime")
            .field("activity_cache", &self.activity_cache)
            .field("schema_validation", &self.schema_validation)
            .finish()
    }
}

impl ProcessorRuntime {
    pub fn new(
        bus: Arc<dyn BusGateway>,
        cache: Arc<dyn CacheGateway>,
        schemas: Arc<dyn SchemaResolver>,
        plugins: Arc<PluginRegistry>,
        activity_cache: ProcessorActivityDataCacheConfig,
        schema_validation: SchemaValidationConfig,
    ) -> Self {
        Self { bus, cache, schemas, plugins, activity_cache, schema_validation }
    }

    /// Poll `queue` for up to `max` commands and execute each one (§4.6),
    /// acking regardless of outcome: a plugin failure is a terminal
    /// `ActivityFailedEvent`, not a reason to redeliver the command.
    pub async fn poll_once(&self, queue: &str, max: usize) -> Result<usize, TaskerError> {
        let messages = self.bus.consume_commands(queue, max).await?;
        let mut processed = 0;
        for message in messages {
            self.execute(&message.payload).await;
            self.bus.ack(queue, &message.receipt).await?;
            processed += 1;
        }
        Ok(processed)
    }

    /// The full C7 body (§4.6 steps 1-6). Never returns `Err`: every
    /// failure mode terminates in an `ActivityFailedEvent` publish, per
    /// step 6's "on any raised error".
    pub async fn execute(&self, command: &tasker_shared::bus::ExecuteActivityCommand) {
        let frame = command.frame();
        let span = tasker_shared::execution_span!(frame);
        let _entered = span.enter();
        let started = Instant::now();

        if let Err(err) = self.execute_inner(command, &frame).await {
            let is_validation_failure = matches!(err, TaskerError::ValidationFailure(_));
            let event = ActivityFailedEvent {
                frame,
                duration_ms: started.elapsed().as_millis() as u64,
                error_message: err.to_string(),
                exception_type: None,
                stack_trace: None,
                is_validation_failure,
            };
            if let Err(publish_err) = self.bus.publish_failed(ACTIVITY_EVENTS_QUEUE, event).await {
                tracing::error!(?publish_err, "failed to publish ActivityFailedEvent");
            }
        }
    }

    async fn execute_inner(
        &self,
        command: &tasker_shared::bus::ExecuteActivityCommand,
        frame: &ExecutionFrame,
    ) -> Result<(), TaskerError> {
        // Step 1: read input blob (may be empty).
        let input_key = activity_key(frame);
        let input_bytes = self
            .cache
            .get(&self.activity_cache.map_name, &input_key.to_string())
            .await?;
        let input: Value = match input_bytes {
            Some(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)?,
            _ => Value::Null,
        };

        // Locate the bound plugin (§3 "Polymorphic assignments").
        let resolved = self.plugins.resolve_for(&command.entities).ok_or_else(|| {
            TaskerError::PluginException(format!(
                "no plugin bound to step {}",
                command.step_id
            ))
        })?;

        // Step 2: validate input.
        if self.schema_validation.enable_input_validation
            && resolved.descriptor.enable_input_validation
        {
            if let Some(schema_id) = resolved.descriptor.input_schema_id {
                let schema = self.schemas.resolve(schema_id).await?;
                validate(&schema.definition, &input)?;
            }
        }

        // Step 3: invoke the bound plugin, honouring its own timeout.
        let timeout = Duration::from_millis(resolved.descriptor.execution_timeout_ms);
        let output = tokio::time::timeout(
            timeout,
            resolved.handler.invoke(frame, &command.entities, input),
        )
        .await
        .map_err(|_| TaskerError::PluginTimeout(timeout))??;

        // Step 4: validate output.
        if self.schema_validation.enable_output_validation
            && resolved.descriptor.enable_output_validation
        {
            if let Some(schema_id) = resolved.descriptor.output_schema_id {
                let schema = self.schemas.resolve(schema_id).await?;
                validate(&schema.definition, &output)?;
            }
        }

        // Step 5: write output blob under this processor's own key for
        // `(executionId, publishId)` — the same key C5/C6 will read as
        // the *source* blob of this step (§4.1 key schema).
        let output_bytes = serde_json::to_vec(&output)?;
        let output_len = output_bytes.len() as u64;
        self.cache
            .set(
                &self.activity_cache.map_name,
                &input_key.to_string(),
                output_bytes,
                Some(Duration::from_secs(900)),
            )
            .await?;

        // Step 6: publish the success event.
        let event = tasker_orchestration_event(
            *frame,
            ActivityStatus::Completed,
            0,
            output_len,
            command.entities.len() as u32,
        );
        self.bus.publish_executed(ACTIVITY_EVENTS_QUEUE, event).await?;
        Ok(())
    }
}

fn tasker_orchestration_event(
    frame: ExecutionFrame,
    status: ActivityStatus,
    duration_ms: u64,
    result_data_size: u64,
    entities_processed: u32,
) -> tasker_shared::bus::ActivityExecutedEvent {
    tasker_shared::bus::ActivityExecutedEvent {
        frame,
        status,
        duration_ms,
        result_data_size,
        entities_processed,
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
