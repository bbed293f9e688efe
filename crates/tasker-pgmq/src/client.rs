//! Thin, ergonomic wrapper over `pgmq::PGMQueueExt` (§4.2 Bus Gateway,
//! Postgres backend).
//!
//! Kept as its own type rather than using the raw `pgmq` client
//! directly so [`PgmqBus`](crate::bus::PgmqBus) can depend on method
//! names that read like the domain ("send a JSON message") instead of
//! the library's generic queue vocabulary.

use crate::error::PgmqError;
use pgmq::PGMQueueExt;
use serde_json::Value;
use sqlx::PgPool;

/// A message popped off a queue, with pgmq's own read-count so callers
/// can tell a redelivery from a first delivery (§4.2, §8 invariant 3).
#[derive(Debug, Clone)]
pub struct PgmqMessage {
    pub msg_id: i64,
    pub message: Value,
    pub read_ct: i32,
}

#[derive(Debug, Clone)]
pub struct PgmqClient {
    queue: PGMQueueExt<Value>,
}

impl PgmqClient {
    /// Build a client over an already-connected pool, running pgmq's
    /// own one-time schema initialization.
    pub async fn new_with_pool(pool: PgPool) -> Result<Self, PgmqError> {
        let queue = PGMQueueExt::new_with_pool(pool).await;
        queue.init().await?;
        Ok(Self { queue })
    }

    pub async fn create_queue(&self, name: &str) -> Result<(), PgmqError> {
        self.queue.create(name).await?;
        Ok(())
    }

    pub async fn drop_queue(&self, name: &str) -> Result<(), PgmqError> {
        self.queue.destroy(name).await?;
        Ok(())
    }

    pub async fn send_json_message(&self, queue: &str, message: &Value) -> Result<i64, PgmqError> {
        let id = self.queue.send(queue, message).await?;
        Ok(id)
    }

    pub async fn read_messages(
        &self,
        queue: &str,
        visibility_timeout_seconds: i32,
        limit: i32,
    ) -> Result<Vec<PgmqMessage>, PgmqError> {
        let messages = self
            .queue
            .read_batch(queue, visibility_timeout_seconds, limit)
            .await?
            .unwrap_or_default();
        Ok(messages
            .into_iter()
            .map(|msg| PgmqMessage {
                msg_id: msg.msg_id,
                message: msg.message,
                read_ct: msg.read_ct,
            })
            .collect())
    }

    pub async fn delete_message(&self, queue: &str, msg_id: i64) -> Result<(), PgmqError> {
        self.queue.delete(queue, msg_id).await?;
        Ok(())
    }

    pub async fn archive_message(&self, queue: &str, msg_id: i64) -> Result<(), PgmqError> {
        self.queue.archive(queue, msg_id).await?;
        Ok(())
    }

    /// Reset the visibility timeout to make a message immediately
    /// redeliverable, the bus-side equivalent of a nack (§4.2).
    pub async fn reset_visibility(&self, queue: &str, msg_id: i64) -> Result<(), PgmqError> {
        self.queue.set_vt(queue, msg_id, 0).await?;
        Ok(())
    }
}
