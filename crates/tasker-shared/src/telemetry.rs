//! Tracing/logging bootstrap (§11).
//!
//! Every binary in the workspace (`tasker-orchestration::bin::server`,
//! the worker server, the CLI) calls [`init`] once at startup. An
//! env-filter + fmt layer is the default; set `TASKER_LOG_JSON=1` to
//! switch the fmt layer to JSON for log-aggregator consumption.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Initialize the global `tracing` subscriber. Safe to call more than
/// once per process only in tests (guarded by `try_init`, which
/// no-ops past the first successful call).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TASKER_LOG_JSON")
        .map(|v| v == "1")
        .unwrap_or(false);

    let registry = Registry::default().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}

/// Builds the `tracing::info_span!` every C5/C6 invocation runs inside,
/// carrying the six-ID execution frame as span fields (§11) — the
/// concrete mechanism behind §6's "every log record ... includes it
/// plus the six-ID hierarchy."
#[macro_export]
macro_rules! execution_span {
    ($frame:expr) => {
        tracing::info_span!(
            "activity_event",
            orchestrated_flow_id = %$frame.orchestrated_flow_id,
            workflow_id = %$frame.workflow_id,
            correlation_id = %$frame.correlation_id,
            step_id = %$frame.step_id,
            processor_id = %$frame.processor_id,
            execution_id = %$frame.execution_id,
            publish_id = %$frame.publish_id,
        )
    };
}
