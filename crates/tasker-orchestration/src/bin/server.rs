//! Entry point wiring the Scheduler (C4), Activity-Completion/Failure
//! consumers (C5/C6), and Health & Liveness (C8) together, plus the
//! minimal HTTP start API (§4.4 trigger c).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::time::interval;

use tasker_shared::bus::{BusGateway, ACTIVITY_EVENTS_QUEUE, FLOW_CANCEL_QUEUE, FLOW_START_QUEUE};
use tasker_shared::cache::CacheGateway;
use tasker_shared::cache::InMemoryCache;
use tasker_shared::config::TaskerConfig;
use tasker_shared::domain::ProcessorKey;
use tasker_shared::ids::{CorrelationId, OrchestratedFlowId};

use tasker_orchestration::{Consumer, HealthMonitor, HttpFlowResolver, ModelStore, Scheduler};

#[derive(Clone)]
struct AppState {
    scheduler: Arc<Scheduler>,
    health: HealthMonitor,
}

/// `GET /processors/:version/:name/health` (§6, §9 "Health-gated
/// admission") — the read side of C8's contract, exposed so
/// `tasker-ctl` and operators can check a processor's heartbeat
/// without reaching into the cache directly.
async fn processor_health(
    State(state): State<AppState>,
    Path((version, name)): Path<(u32, String)>,
) -> impl IntoResponse {
    let key = ProcessorKey { version, name };
    match state.health.is_healthy(&key).await {
        Ok(healthy) => (StatusCode::OK, Json(healthy)).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    correlation_id: Option<CorrelationId>,
}

async fn start_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<OrchestratedFlowId>,
    body: Option<Json<StartRequest>>,
) -> impl IntoResponse {
    let correlation_id = body.and_then(|Json(req)| req.correlation_id);
    match state.scheduler.start_flow(flow_id, correlation_id).await {
        Ok(execution_id) => (StatusCode::ACCEPTED, execution_id.to_string()).into_response(),
        Err(err) if matches!(err, tasker_shared::errors::TaskerError::ValidationFailure(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tasker_shared::telemetry::init();

    let config_dir = std::env::var("TASKER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/tasker"));
    let config = TaskerConfig::load(&config_dir).unwrap_or_default();

    let bus = build_bus().await?;
    let cache: Arc<dyn CacheGateway> = Arc::new(InMemoryCache::new());

    let model_store = ModelStore::new(cache.clone(), config.orchestration_data_cache.clone());
    let health = HealthMonitor::new(cache.clone(), config.orchestrator_health_monitor.clone());
    let resolver = Arc::new(HttpFlowResolver::new(config.manager_urls.clone()));
    let scheduler = Arc::new(Scheduler::new(
        bus.clone(),
        model_store.clone(),
        resolver,
        health.clone(),
    ));
    let consumer = Arc::new(Consumer::new(
        bus.clone(),
        cache.clone(),
        config.orchestration_data_cache.clone(),
        config.processor_activity_data_cache.clone(),
    ));

    spawn_terminal_event_loop(consumer.clone());
    spawn_start_command_loop(bus.clone(), scheduler.clone());
    spawn_cancel_command_loop(bus.clone(), model_store.clone());

    let app = Router::new()
        .route("/flows/:flow_id/start", post(start_flow))
        .route("/processors/:version/:name/health", get(processor_health))
        .with_state(AppState { scheduler, health });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8090").await?;
    tracing::info!("tasker-orchestration-server listening on 0.0.0.0:8090");
    axum::serve(listener, app).await?;
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

fn spawn_terminal_event_loop(consumer: Arc<Consumer>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(500));
        loop {
            ticker.tick().await;
            if let Err(err) = consumer.poll_once(ACTIVITY_EVENTS_QUEUE, 50).await {
                tracing::error!(?err, "terminal event poll failed");
            }
        }
    });
}

fn spawn_start_command_loop(bus: Arc<dyn BusGateway>, scheduler: Arc<Scheduler>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            match bus.consume_start(FLOW_START_QUEUE, 20).await {
                Ok(messages) => {
                    for message in messages {
                        let result = scheduler
                            .start_flow(
                                message.payload.orchestrated_flow_id,
                                message.payload.correlation_id,
                            )
                            .await;
                        match result {
                            Ok(_) => {
                                let _ = bus.ack(FLOW_START_QUEUE, &message.receipt).await;
                            }
                            Err(err) => {
                                tracing::error!(?err, "flow start failed");
                                let _ = bus.nack(FLOW_START_QUEUE, &message.receipt).await;
                            }
                        }
                    }
                }
                Err(err) => tracing::error!(?err, "start command poll failed"),
            }
        }
    });
}

fn spawn_cancel_command_loop(bus: Arc<dyn BusGateway>, model_store: ModelStore) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            match bus.consume_cancel(FLOW_CANCEL_QUEUE, 20).await {
                Ok(messages) => {
                    for message in messages {
                        let result = model_store
                            .mark_cancelled(message.payload.orchestrated_flow_id)
                            .await;
                        match result {
                            Ok(()) => {
                                let _ = bus.ack(FLOW_CANCEL_QUEUE, &message.receipt).await;
                            }
                            Err(err) => {
                                tracing::error!(?err, "flow cancel failed");
                                let _ = bus.nack(FLOW_CANCEL_QUEUE, &message.receipt).await;
                            }
                        }
                    }
                }
                Err(err) => tracing::error!(?err, "cancel command poll failed"),
            }
        }
    });
}
