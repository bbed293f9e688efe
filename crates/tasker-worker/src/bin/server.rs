//! Entry point wiring the Processor Runtime (C7) to one bound
//! `(processor.version, processor.name)` queue, plus the §9
//! health-heartbeat contract C8's `HealthMonitor` reads.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use tasker_shared::bus::BusGateway;
use tasker_shared::cache::{CacheGateway, InMemoryCache};
use tasker_shared::config::TaskerConfig;
use tasker_shared::domain::ProcessorKey;

use tasker_worker::{HttpSchemaResolver, PluginRegistry, ProcessorRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tasker_shared::telemetry::init();

    let config_dir = std::env::var("TASKER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/tasker"));
    let config = TaskerConfig::load(&config_dir).unwrap_or_default();

    let processor_key = ProcessorKey {
        version: std::env::var("PROCESSOR_VERSION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1),
        name: config.manager_configuration.name.clone(),
    };
    let queue = tasker_shared::bus::processor_queue_name(&processor_key);

    let bus = build_bus().await?;
    let cache: Arc<dyn CacheGateway> = Arc::new(InMemoryCache::new());
    let schemas = Arc::new(HttpSchemaResolver::new(config.manager_urls.clone()));

    // Plugin handlers are registered by the embedding binary in a real
    // deployment (§4.6 "contract only"); this entry point starts with
    // an empty registry so every command fails over to the
    // `ActivityFailedEvent` path until handlers are wired in.
    let plugins = Arc::new(PluginRegistry::new());

    let runtime = Arc::new(ProcessorRuntime::new(
        bus.clone(),
        cache.clone(),
        schemas,
        plugins,
        config.processor_activity_data_cache.clone(),
        config.schema_validation.clone(),
    ));

    spawn_command_loop(runtime, queue);
    spawn_health_heartbeat(cache, processor_key, config.processor_health_monitor.clone());

    tracing::info!("tasker-worker-server running, Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    Ok(())
}

async fn build_bus() -> anyhow::Result<Arc<dyn BusGateway>> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new().connect(&url).await?;
            Ok(Arc::new(tasker_pgmq::PgmqBus::new(pool).await?))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, falling back to an in-memory bus");
            Ok(Arc::new(tasker_shared::bus::InMemoryBus::new()))
        }
    }
}

fn spawn_command_loop(runtime: Arc<ProcessorRuntime>, queue: String) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(500));
        loop {
            ticker.tick().await;
            if let Err(err) = runtime.poll_once(&queue, 20).await {
                tracing::error!(?err, "command poll failed");
            }
        }
    });
}

fn spawn_health_heartbeat(
    cache: Arc<dyn CacheGateway>,
    processor_key: ProcessorKey,
    config: tasker_shared::config::ProcessorHealthMonitorConfig,
) {
    tokio::spawn(async move {
        let interval_duration = Duration::from_secs(config.health_check_interval_seconds);
        let mut ticker = interval(interval_duration);
        loop {
            ticker.tick().await;
            let ttl = interval_duration * 3;
            if let Err(err) = cache
                .set("processor-health", &processor_key.to_string(), Vec::new(), Some(ttl))
                .await
            {
                tracing::error!(?err, "health heartbeat failed");
            }
        }
    });
}
