//! [`BusGateway`] implementation over Postgres via [`PgmqClient`]
//! (§4.2). Queues are created lazily on first use; each logical queue
//! name the engine passes in (a processor's composite key, or one of
//! the three well-known constants in `tasker_shared::bus`) maps to
//! exactly one pgmq queue holding exactly one message shape, so no
//! envelope tagging is needed except for the two terminal-event kinds
//! sharing `ACTIVITY_EVENTS_QUEUE`.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use tasker_shared::bus::{
    ActivityExecutedEvent, ActivityFailedEvent, BusGateway, CancelOrchestratedFlowCommand,
    ExecuteActivityCommand, QueuedMessage, ReceiptHandle, StartOrchestratedFlowCommand,
    TerminalEvent,
};
use tasker_shared::errors::BusError;

use crate::client::PgmqClient;

const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: i32 = 30;

#[derive(Debug)]
pub struct PgmqBus {
    client: PgmqClient,
    known_queues: Mutex<HashSet<String>>,
}

impl PgmqBus {
    pub async fn new(pool: PgPool) -> Result<Self, BusError> {
        let client = PgmqClient::new_with_pool(pool)
            .await
            .map_err(BusError::from)?;
        Ok(Self {
            client,
            known_queues: Mutex::new(HashSet::new()),
        })
    }

    async fn ensure_queue(&self, queue: &str) -> Result<(), BusError> {
        let already_known = self.known_queues.lock().unwrap().contains(queue);
        if already_known {
            return Ok(());
        }
        self.client
            .create_queue(queue)
            .await
            .map_err(BusError::from)?;
        self.known_queues.lock().unwrap().insert(queue.to_string());
        Ok(())
    }

    fn receipt_for(queue: &str, msg_id: i64) -> ReceiptHandle {
        ReceiptHandle(format!("{queue}:{msg_id}"))
    }

    fn parse_receipt(receipt: &ReceiptHandle) -> Result<(String, i64), BusError> {
        let (queue, id) = receipt
            .0
            .rsplit_once(':')
            .ok_or_else(|| BusError::Unavailable(format!("malformed receipt {}", receipt.0)))?;
        let msg_id: i64 = id
            .parse()
            .map_err(|_| BusError::Unavailable(format!("malformed receipt {}", receipt.0)))?;
        Ok((queue.to_string(), msg_id))
    }

    async fn publish<T: Serialize>(&self, queue: &str, payload: &T) -> Result<(), BusError> {
        self.ensure_queue(queue).await?;
        let value = serde_json::to_value(payload)
            .map_err(|err| BusError::Unavailable(err.to_string()))?;
        self.client
            .send_json_message(queue, &value)
            .await
            .map_err(BusError::from)?;
        Ok(())
    }

    async fn consume<T: for<'de> Deserialize<'de>>(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<T>>, BusError> {
        self.ensure_queue(queue).await?;
        let messages = self
            .client
            .read_messages(queue, DEFAULT_VISIBILITY_TIMEOUT_SECONDS, max as i32)
            .await
            .map_err(BusError::from)?;
        messages
            .into_iter()
            .map(|message| {
                let payload: T = serde_json::from_value(message.message)
                    .map_err(|err| BusError::Unavailable(err.to_string()))?;
                Ok(QueuedMessage {
                    payload,
                    receipt: Self::receipt_for(queue, message.msg_id),
                    is_redelivery: message.read_ct > 1,
                })
            })
            .collect()
    }
}

#[async_trait]
impl BusGateway for PgmqBus {
    async fn publish_command(
        &self,
        queue: &str,
        command: ExecuteActivityCommand,
    ) -> Result<(), BusError> {
        self.publish(queue, &command).await
    }

    async fn consume_commands(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<ExecuteActivityCommand>>, BusError> {
        self.consume(queue, max).await
    }

    async fn publish_executed(
        &self,
        queue: &str,
        event: ActivityExecutedEvent,
    ) -> Result<(), BusError> {
        self.publish(queue, &json!({"kind": "Executed", "payload": event})).await
    }

    async fn publish_failed(
        &self,
        queue: &str,
        event: ActivityFailedEvent,
    ) -> Result<(), BusError> {
        self.publish(queue, &json!({"kind": "Failed", "payload": event})).await
    }

    async fn consume_terminal_events(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<TerminalEvent>>, BusError> {
        self.ensure_queue(queue).await?;
        let messages = self
            .client
            .read_messages(queue, DEFAULT_VISIBILITY_TIMEOUT_SECONDS, max as i32)
            .await
            .map_err(BusError::from)?;
        messages
            .into_iter()
            .map(|message| {
                let kind = message
                    .message
                    .get("kind")
                    .and_then(|k| k.as_str())
                    .ok_or_else(|| BusError::Unavailable("terminal event missing kind".into()))?;
                let payload_value = message
                    .message
                    .get("payload")
                    .cloned()
                    .ok_or_else(|| BusError::Unavailable("terminal event missing payload".into()))?;
                let event = match kind {
                    "Executed" => TerminalEvent::Executed(
                        serde_json::from_value(payload_value)
                            .map_err(|err| BusError::Unavailable(err.to_string()))?,
                    ),
                    "Failed" => TerminalEvent::Failed(
                        serde_json::from_value(payload_value)
                            .map_err(|err| BusError::Unavailable(err.to_string()))?,
                    ),
                    other => {
                        return Err(BusError::Unavailable(format!(
                            "unknown terminal event kind {other}"
                        )))
                    }
                };
                Ok(QueuedMessage {
                    payload: event,
                    receipt: Self::receipt_for(queue, message.msg_id),
                    is_redelivery: message.read_ct > 1,
                })
            })
            .collect()
    }

    async fn ack(&self, _queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError> {
        let (queue, msg_id) = Self::parse_receipt(receipt)?;
        self.client
            .delete_message(&queue, msg_id)
            .await
            .map_err(BusError::from)
    }

    async fn nack(&self, _queue: &str, receipt: &ReceiptHandle) -> Result<(), BusError> {
        let (queue, msg_id) = Self::parse_receipt(receipt)?;
        self.client
            .reset_visibility(&queue, msg_id)
            .await
            .map_err(BusError::from)
    }

    async fn publish_start(
        &self,
        queue: &str,
        command: StartOrchestratedFlowCommand,
    ) -> Result<(), BusError> {
        self.publish(queue, &command).await
    }

    async fn consume_start(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<StartOrchestratedFlowCommand>>, BusError> {
        self.consume(queue, max).await
    }

    async fn publish_cancel(
        &self,
        queue: &str,
        command: CancelOrchestratedFlowCommand,
    ) -> Result<(), BusError> {
        self.publish(queue, &command).await
    }

    async fn consume_cancel(
        &self,
        queue: &str,
        max: usize,
    ) -> Result<Vec<QueuedMessage<CancelOrchestratedFlowCommand>>, BusError> {
        self.consume(queue, max).await
    }
}
