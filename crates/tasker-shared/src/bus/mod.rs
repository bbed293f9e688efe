//! Bus Gateway (C2, §4.2) — at-least-once publish/consume over durable
//! queues, addressed by the processor composite key `(version, name)`.

pub mod in_memory;
pub mod messages;

use crate::errors::BusError;
use async_trait::async_trait;
pub use in_memory::InMemoryBus;
pub use messages::{
    ActivityExecutedEvent, ActivityFailedEvent, CancelOrchestratedFlowCommand,
    ExecuteActivityCommand, StartOrchestratedFlowCommand,
};

/// An opaque receipt a consumer acks/nacks after processing a
/// [`QueuedMessage`] (§4.2 "competing consumers", §5 "the bus' retry
/// policy will redeliver").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

/// A message pulled off a queue along with its delivery receipt.
#[derive(Debug, Clone)]
pub struct QueuedMessage<T> {
    pub payload: T,
    pub receipt: ReceiptHandle,
    /// `true` when the bus' at-least-once delivery is redelivering this
    /// message after a prior delivery wasn't acked (§4.2, §8 invariant 3).
    pub is_redelivery: bool,
}

/// Durable, at-least-once publish/subscribe (§4.2).
///
/// Queue names are plain strings rather than an enum: commands are
/// routed by the processor composite key (`"{version}/{name}"`, via
/// [`crate::domain::ProcessorKey`]'s `Display`), while events flow
/// through one well-known queue the orchestration consumers poll.
#[async_trait]
pub trait BusGateway: Send + Sync + std::fmt::Debug {
    async fn publish_command(
        &self,
        queue: &str,
        command: ExecuteActivityCommand,
    ) -> Result<(), BusError>;

    async fn consume_commands(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<ExecuteActivityCommand>>, BusError>;

    async fn publish_executed(
        &self,
        queue: &str,
        event: ActivityExecutedEvent,
    ) -> Result<(), BusError>;

    async fn publish_failed(&self, queue: &str, event: ActivityFailedEvent)
        -> Result<(), BusError>;

    /// Polymorphic over the two terminal event kinds since C5/C6 share
    /// one consume loop shape (§4.5 "near-mirror state machines").
    async fn consume_terminal_events(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<TerminalEvent>>, BusError>;

    async fn ack(&self, queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError>;

    async fn nack(&self, queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError>;

    async fn publish_start(
        &self,
        queue: &str,
        command: StartOrchestratedFlowCommand,
    ) -> Result<(), BusError>;

    async fn consume_start(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<StartOrchestratedFlowCommand>>, BusError>;

    async fn publish_cancel(
        &self,
        queue: &str,
        command: CancelOrchestratedFlowCommand,
    ) -> Result<(), BusError>;

    async fn consume_cancel(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<CancelOrchestratedFlowCommand>>, BusError>;
}

/// A terminal event of either kind, dispatched to C5 or C6 by the
/// consumer loop depending on which variant it observes (§4.5 "Status
/// from event kind").
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    Executed(ActivityExecutedEvent),
    Failed(ActivityFailedEvent),
}

impl TerminalEvent {
    pub fn frame(&self) -> crate::domain::ExecutionFrame {
        match self {
            TerminalEvent::Executed(event) => event.frame,
            TerminalEvent::Failed(event) => event.frame,
        }
    }

    /// C6 always observes `Failed`; C5 derives status from the event
    /// payload (§4.5 "Status from event kind").
    pub fn status(&self) -> crate::domain::ActivityStatus {
        match self {
            TerminalEvent::Executed(event) => event.status,
            TerminalEvent::Failed(_) => crate::domain::ActivityStatus::Failed,
        }
    }
}

/// Canonical queue name for the processor composite key (§4.2).
pub fn processor_queue_name(key: &crate::domain::ProcessorKey) -> String {
    format!("execute-activity:{}/{}", key.version, key.name)
}

/// The single queue orchestration consumers poll for terminal events.
pub const ACTIVITY_EVENTS_QUEUE: &str = "activity-events";
/// The queue carrying `StartOrchestratedFlowCommand`s (§4.4 trigger a).
pub const FLOW_START_QUEUE: &str = "flow-start";
/// The queue carrying out-of-band cancellation commands (§5).
pub const FLOW_CANCEL_QUEUE: &str = "flow-cancel";
