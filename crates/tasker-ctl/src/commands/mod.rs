//! Command handlers for the Tasker CLI.
//!
//! Each module handles one subcommand, delegating to `tasker-client`
//! for orchestrator calls and to `tasker-sdk` for local schema diffing.

pub(crate) mod flow;
pub(crate) mod health;
pub(crate) mod schema;

pub(crate) use flow::handle_start;
pub(crate) use health::handle_health;
pub(crate) use schema::handle_schema_diff;
