//! Postgres-backed [`BusGateway`](tasker_shared::bus::BusGateway)
//! implementation over `pgmq`, usable as the engine's bus in
//! single-database deployments (§10 workspace layout).

pub mod bus;
pub mod client;
pub mod error;

pub use bus::PgmqBus;
pub use client::{PgmqClient, PgmqMessage};
pub use error::PgmqError;
