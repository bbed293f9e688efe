//! Error surface for the Postgres-backed bus (§4.2, §7).
//!
//! Every failure mode reduces to the two transient kinds
//! [`tasker_shared::errors::BusError`] already names — there is no
//! queue-specific error the rest of the engine needs to distinguish.

use tasker_shared::errors::BusError;

#[derive(Debug, thiserror::Error)]
pub enum PgmqError {
    #[error("pgmq operation failed: {0}")]
    Queue(#[from] pgmq::errors::PgmqError),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("message payload was not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PgmqError> for BusError {
    fn from(err: PgmqError) -> Self {
        BusError::Unavailable(err.to_string())
    }
}
