//! Processor Runtime (C7, §4.6) — the host-side contract every plugin
//! executes behind: input/output blob handling via the Cache Gateway,
//! JSON Schema validation, per-plugin timeout enforcement, and
//! publishing the terminal event the Activity-Completion/Failure
//! consumers (`tasker-orchestration`) observe.

pub mod plugin;
pub mod runtime;
pub mod schema;

pub use plugin::{plugin_assignment, PluginHandler, PluginRegistry, ResolvedPlugin};
pub use runtime::ProcessorRuntime;
pub use schema::{validate, HttpSchemaResolver, SchemaResolver};
