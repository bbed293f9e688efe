//! Plugin invocation (§4.6 step 3).
//!
//! Dynamic loading of `(assembly_base_path, type_name, version)` is out
//! of scope (§1, §9): the processor runtime resolves the bound
//! [`Plugin`] descriptor to a host-registered [`PluginHandler`] by its
//! `type_name` rather than loading an assembly off disk.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tasker_shared::domain::{Assignment, ExecutionFrame, Plugin};
use tasker_shared::errors::TaskerError;

/// The host-side unit of work bound to a `Plugin.typeName` (§4.6 step 3).
///
/// Implementors own their own isolation strategy; the runtime only
/// owns the timeout (via `tokio::time::timeout`) and the blob/schema
/// plumbing around the call.
#[async_trait]
pub trait PluginHandler: Send + Sync + std::fmt::Debug {
    async fn invoke(
        &self,
        frame: &ExecutionFrame,
        entities: &[Assignment],
        input: Value,
    ) -> Result<Value, TaskerError>;
}

/// Maps a `Plugin.typeName` to its host-registered [`PluginHandler`].
#[derive(Debug, Default)]
pub struct PluginRegistry {
    handlers: DashMap<String, Arc<dyn PluginHandler>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, type_name: impl Into<String>, handler: Arc<dyn PluginHandler>) {
        self.handlers.insert(type_name.into(), handler);
    }

    pub fn resolve(&self, type_name: &str) -> Option<Arc<dyn PluginHandler>> {
        self.handlers.get(type_name).map(|entry| entry.value().clone())
    }
}

/// Locates the `Assignment::Plugin` bound to this step, if any (§3
/// "Polymorphic assignments"). A step with no plugin-kind assignment
/// has nothing for the runtime to invoke.
pub fn plugin_assignment(entities: &[Assignment]) -> Option<&Plugin> {
    entities.iter().find_map(|assignment| match &assignment.kind {
        tasker_shared::domain::AssignmentKind::Plugin { plugin, .. } => Some(plugin),
        _ => None,
    })
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use super::*;

    /// A [`PluginHandler`] returning a fixed result (or raising a fixed
    /// error), for deterministic runtime tests.
    #[derive(Debug)]
    pub struct EchoPlugin {
        pub delay: Option<std::time::Duration>,
        pub outcome: Result<Value, String>,
    }

    impl EchoPlugin {
        pub fn ok(value: Value) -> Self {
            Self { delay: None, outcome: Ok(value) }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self { delay: None, outcome: Err(message.into()) }
        }

        pub fn slow(delay: std::time::Duration, value: Value) -> Self {
            Self { delay: Some(delay), outcome: Ok(value) }
        }
    }

    #[async_trait]
    impl PluginHandler for EchoPlugin {
        async fn invoke(
            &self,
            _frame: &ExecutionFrame,
            _entities: &[Assignment],
            _input: Value,
        ) -> Result<Value, TaskerError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome
                .clone()
                .map_err(TaskerError::PluginException)
        }
    }
}

/// Built from an `Assignment::Plugin`'s descriptor fields, carried
/// alongside the resolved handler so the runtime doesn't have to
/// re-destructure the assignment at every call site.
#[derive(Debug, Clone)]
pub struct ResolvedPlugin {
    pub descriptor: Plugin,
    pub handler: Arc<dyn PluginHandler>,
}

impl PluginRegistry {
    pub fn resolve_for(&self, entities: &[Assignment]) -> Option<ResolvedPlugin> {
        let descriptor = plugin_assignment(entities)?.clone();
        let handler = self.resolve(&descriptor.type_name)?;
        Some(ResolvedPlugin { descriptor, handler })
    }
}
