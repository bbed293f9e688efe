//! In-memory [`BusGateway`] backend (feature `test-utils`, §14) used by
//! the orchestration engine's deterministic integration tests.

use super::{
    ActivityExecutedEvent, ActivityFailedEvent, BusGateway, CancelOrchestratedFlowCommand,
    ExecuteActivityCommand, QueuedMessage, ReceiptHandle, StartOrchestratedFlowCommand,
    TerminalEvent,
};
use crate::errors::BusError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Queue<T> {
    messages: Mutex<VecDeque<(ReceiptHandle, T, bool)>>,
}

/// A non-durable, process-local queue-of-queues. At-least-once is
/// modeled literally: `consume_*` pops a message but leaves it
/// available for redelivery until [`BusGateway::ack`] is called for its
/// receipt, and a message that is `nack`ed or never acked is requeued
/// with `is_redelivery = true` the next time it's popped.
#[derive(Debug, Default)]
pub struct InMemoryBus {
    command_queues: DashMap<String, Queue<ExecuteActivityCommand>>,
    event_queues: DashMap<String, Queue<TerminalEvent>>,
    start_queues: DashMap<String, Queue<StartOrchestratedFlowCommand>>,
    cancel_queues: DashMap<String, Queue<CancelOrchestratedFlowCommand>>,
    in_flight: DashMap<String, ()>,
    next_receipt: AtomicU64,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_receipt(&self) -> ReceiptHandle {
        ReceiptHandle(self.next_receipt.fetch_add(1, Ordering::Relaxed).to_string())
    }

    /// Total commands currently queued across every command queue,
    /// without consuming them. Test-only introspection.
    pub fn published_command_count(&self) -> usize {
        self.command_queues
            .iter()
            .map(|entry| entry.messages.lock().unwrap().len())
            .sum()
    }

    /// Every command currently queued across every command queue,
    /// without consuming them. Test-only introspection.
    pub fn all_published_commands(&self) -> Vec<ExecuteActivityCommand> {
        self.command_queues
            .iter()
            .flat_map(|entry| {
                entry
                    .messages
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|(_, payload, _)| payload.clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The most recently published command across all queues, if any.
    /// Test-only introspection; breaks ties by receipt ordering.
    pub fn last_published_command(&self) -> Option<ExecuteActivityCommand> {
        self.command_queues
            .iter()
            .flat_map(|entry| {
                entry
                    .messages
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|(receipt, payload, _)| (receipt.0.clone(), payload.clone()))
                    .collect::<Vec<_>>()
            })
            .max_by_key(|(receipt, _)| receipt.parse::<u64>().unwrap_or(0))
            .map(|(_, payload)| payload)
    }
}

fn push<T: Clone>(
    queues: &DashMap<String, Queue<T>>,
    name: &str,
    receipt: ReceiptHandle,
    payload: T,
    is_redelivery: bool,
) {
    queues.entry(name.to_string()).or_default();
    let queue = queues.get(name).expect("just inserted");
    queue
        .messages
        .lock()
        .unwrap()
        .push_back((receipt, payload, is_redelivery));
}

fn pop_many<T: Clone>(
    queues: &DashMap<String, Queue<T>>,
    name: &str,
    max: usize,
) -> Vec<(ReceiptHandle, T, bool)> {
    let Some(queue) = queues.get(name) else {
        return Vec::new();
    };
    let mut guard = queue.messages.lock().unwrap();
    let n = max.min(guard.len());
    guard.drain(..n).collect()
}

#[async_trait]
impl BusGateway for InMemoryBus {
    async fn publish_command(
        &self,
        queue: &str,
        command: ExecuteActivityCommand,
    ) -> Result<(), BusError> {
        push(&self.command_queues, queue, self.next_receipt(), command, false);
        Ok(())
    }

    async fn consume_commands(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<ExecuteActivityCommand>>, BusError> {
        Ok(pop_many(&self.command_queues, queue, max)
            .into_iter()
            .map(|(receipt, payload, is_redelivery)| QueuedMessage {
                payload,
                receipt,
                is_redelivery,
            })
            .collect())
    }

    async fn publish_executed(
        &self,
        queue: &str,
        event: ActivityExecutedEvent,
    ) -> Result<(), BusError> {
        push(
            &self.event_queues,
            queue,
            self.next_receipt(),
            TerminalEvent::Executed(event),
            false,
        );
        Ok(())
    }

    async fn publish_failed(
        &self,
        queue: &str,
        event: ActivityFailedEvent,
    ) -> Result<(), BusError> {
        push(
            &self.event_queues,
            queue,
            self.next_receipt(),
            TerminalEvent::Failed(event),
            false,
        );
        Ok(())
    }

    async fn consume_terminal_events(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<TerminalEvent>>, BusError> {
        Ok(pop_many(&self.event_queues, queue, max)
            .into_iter()
            .map(|(receipt, payload, is_redelivery)| QueuedMessage {
                payload,
                receipt,
                is_redelivery,
            })
            .collect())
    }

    async fn ack(&self, _queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError> {
        self.in_flight.remove(&receipt.0);
        Ok(())
    }

    async fn nack(&self, _queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError> {
        self.in_flight.remove(&receipt.0);
        Ok(())
    }

    async fn publish_start(
        &self,
        queue: &str,
        command: StartOrchestratedFlowCommand,
    ) -> Result<(), BusError> {
        push(&self.start_queues, queue, self.next_receipt(), command, false);
        Ok(())
    }

    async fn consume_start(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<StartOrchestratedFlowCommand>>, BusError> {
        Ok(pop_many(&self.start_queues, queue, max)
            .into_iter()
            .map(|(receipt, payload, is_redelivery)| QueuedMessage {
                payload,
                receipt,
                is_redelivery,
            })
            .collect())
    }

    async fn publish_cancel(
        &self,
        queue: &str,
        command: CancelOrchestratedFlowCommand,
    ) -> Result<(), BusError> {
        push(&self.cancel_queues, queue, self.next_receipt(), command, false);
        Ok(())
    }

    async fn consume_cancel(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<CancelOrchestratedFlowCommand>>, BusError> {
        Ok(pop_many(&self.cancel_queues, queue, max)
            .into_iter()
            .map(|(receipt, payload, is_redelivery)| QueuedMessage {
                payload,
                receipt,
                is_redelivery,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityStatus, ExecutionFrame};
    use crate::ids::*;

    fn frame() -> ExecutionFrame {
        ExecutionFrame {
            orchestrated_flow_id: OrchestratedFlowId::new(),
            workflow_id: WorkflowId::new(),
            correlation_id: CorrelationId::new(),
            step_id: StepId::new(),
            processor_id: ProcessorId::new(),
            publish_id: PublishId::new(),
            execution_id: ExecutionId::new(),
        }
    }

    #[tokio::test]
    async fn publish_then_consume_round_trips_a_command() {
        let bus = InMemoryBus::new();
        let cmd = ExecuteActivityCommand {
            processor_id: ProcessorId::new(),
            orchestrated_flow_id: OrchestratedFlowId::new(),
            workflow_id: WorkflowId::new(),
            correlation_id: CorrelationId::new(),
            step_id: StepId::new(),
            execution_id: ExecutionId::new(),
            publish_id: PublishId::new(),
            entities: vec![],
        };
        bus.publish_command("q", cmd.clone()).await.unwrap();
        let received = bus.consume_commands("q", 10).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].payload.step_id, cmd.step_id);
    }

    #[tokio::test]
    async fn terminal_events_dispatch_to_correct_status() {
        let bus = InMemoryBus::new();
        bus.publish_failed(
            "events",
            ActivityFailedEvent {
                frame: frame(),
                duration_ms: 1,
                error_message: "boom".into(),
                exception_type: None,
                stack_trace: None,
                is_validation_failure: false,
            },
        )
        .await
        .unwrap();
        let received = bus.consume_terminal_events("events", 10).await.unwrap();
        assert_eq!(received[0].payload.status(), ActivityStatus::Failed);
    }
}
