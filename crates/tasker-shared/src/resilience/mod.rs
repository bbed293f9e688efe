//! Circuit-breaker/resilience primitives (§12 ambient error handling:
//! "transient errors ... are retried with bounded exponential backoff
//! at the call site that owns the retry policy").

pub mod behavior;
pub mod circuit_breaker;
pub mod metrics;

pub use behavior::CircuitBreakerBehavior;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use metrics::{CircuitBreakerMetrics, MetricsCollector, PrometheusMetricsExporter};

use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff retry for transient cache/bus errors
/// (§7 propagation policy). Retries `attempts` times with a doubling
/// delay starting at `base_delay`, capped at `max_delay`.
pub async fn retry_transient<T, E, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut delay = base_delay;
    let mut last_err = None;
    for attempt in 0..attempts.max(1) {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt + 1 < attempts {
                    tracing::warn!(?err, attempt, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(max_delay);
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.expect("attempts >= 1 guarantees at least one iteration"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_transient_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_transient(
            5,
            Duration::from_millis(1),
            Duration::from_millis(5),
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err("not yet")
                } else {
                    Ok(n)
                }
            },
        )
        .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn retry_transient_gives_up_after_attempts_exhausted() {
        let result: Result<(), &str> =
            retry_transient(3, Duration::from_millis(1), Duration::from_millis(2), || async {
                Err("always fails")
            })
            .await;
        assert_eq!(result, Err("always fails"));
    }
}
