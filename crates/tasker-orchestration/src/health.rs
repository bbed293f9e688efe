//! Health & Liveness (C8, §6, §9 "Health-gated admission").
//!
//! Per-processor health entries live in C1 under
//! `OrchestratorHealthMonitor.CacheMapName`, one entry per processor
//! composite key, last-writer-wins, TTL'd so a dead processor's stale
//! "healthy" entry expires rather than lingering forever. The
//! processor runtime (C7, out of scope for this crate) is expected to
//! heartbeat its own entry every `ProcessorHealthMonitor.HealthCheckInterval`
//! seconds; this type only reads and writes the cache-side of that
//! contract.

use std::sync::Arc;
use std::time::Duration;

use tasker_shared::cache::CacheGateway;
use tasker_shared::config::OrchestratorHealthMonitorConfig;
use tasker_shared::domain::ProcessorKey;
use tasker_shared::errors::TaskerError;

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    cache: Arc<dyn CacheGateway>,
    config: OrchestratorHealthMonitorConfig,
}

impl HealthMonitor {
    pub fn new(cache: Arc<dyn CacheGateway>, config: OrchestratorHealthMonitorConfig) -> Self {
        Self { cache, config }
    }

    /// Record a heartbeat for `key`, valid for `ttl` (§6
    /// "per-processor health entries ... with TTL").
    pub async fn heartbeat(&self, key: &ProcessorKey, ttl: Duration) -> Result<(), TaskerError> {
        self.cache
            .set(&self.config.cache_map_name, &key.to_string(), Vec::new(), Some(ttl))
            .await
            .map_err(TaskerError::from)
    }

    /// A processor is healthy iff its heartbeat entry has not expired
    /// (§4.4 "Unhealthy target processors ... short-circuit the
    /// start"). Best-effort: a processor observed healthy here may go
    /// unhealthy moments later (§9).
    pub async fn is_healthy(&self, key: &ProcessorKey) -> Result<bool, TaskerError> {
        self.cache
            .exists(&self.config.cache_map_name, &key.to_string())
            .await
            .map_err(TaskerError::from)
    }

    pub async fn mark_down(&self, key: &ProcessorKey) -> Result<(), TaskerError> {
        self.cache
            .remove(&self.config.cache_map_name, &key.to_string())
            .await
            .map_err(TaskerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_shared::cache::InMemoryCache;

    fn monitor() -> HealthMonitor {
        HealthMonitor::new(
            Arc::new(InMemoryCache::new()),
            OrchestratorHealthMonitorConfig::default(),
        )
    }

    fn key() -> ProcessorKey {
        ProcessorKey {
            version: 1,
            name: "charge-card".into(),
        }
    }

    #[tokio::test]
    async fn processor_with_no_heartbeat_is_unhealthy() {
        let monitor = monitor();
        assert!(!monitor.is_healthy(&key()).await.unwrap());
    }

    #[tokio::test]
    async fn heartbeat_marks_processor_healthy_until_ttl_expires() {
        let monitor = monitor();
        monitor
            .heartbeat(&key(), Duration::from_millis(30))
            .await
            .unwrap();
        assert!(monitor.is_healthy(&key()).await.unwrap());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!monitor.is_healthy(&key()).await.unwrap());
    }

    #[tokio::test]
    async fn mark_down_immediately_clears_health() {
        let monitor = monitor();
        monitor
            .heartbeat(&key(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(monitor.is_healthy(&key()).await.unwrap());
        monitor.mark_down(&key()).await.unwrap();
        assert!(!monitor.is_healthy(&key()).await.unwrap());
    }
}
