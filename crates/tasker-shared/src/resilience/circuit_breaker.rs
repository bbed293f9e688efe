//! Concrete [`CircuitBreakerBehavior`] implementation.
//!
//! `spec.md` doesn't mandate a circuit breaker anywhere in the core
//! algorithm, but §7 requires bounded exponential backoff retries for
//! transient `BusUnavailable`/`CacheUnavailable` errors, and a
//! misbehaving downstream (an unreachable cache shard, a wedged bus
//! broker) should fail fast rather than retry forever. This is the same
//! resilience primitive the corpus wraps its own database/messaging/web
//! call sites in.

use crate::resilience::behavior::CircuitBreakerBehavior;
use crate::resilience::metrics::CircuitBreakerMetrics;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u64,
    pub success_threshold: u64,
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct Counters {
    total_calls: u64,
    success_count: u64,
    failure_count: u64,
    consecutive_failures: u64,
    half_open_calls: u64,
    half_open_successes: u64,
    total_duration: Duration,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            total_calls: 0,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            half_open_calls: 0,
            half_open_successes: 0,
            total_duration: Duration::ZERO,
        }
    }
}

/// A single named circuit breaker guarding one call site (a cache
/// backend, a bus backend, a manager's HTTP endpoint).
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: Mutex<CircuitState>,
    opened_at: Mutex<Option<Instant>>,
    counters: Mutex<Counters>,
    state_transitions: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(CircuitState::Closed),
            opened_at: Mutex::new(None),
            counters: Mutex::new(Counters::default()),
            state_transitions: AtomicU64::new(0),
        }
    }

    fn transition(&self, to: CircuitState) {
        let mut state = self.state.lock().unwrap();
        if *state != to {
            tracing::info!(circuit_breaker = %self.name, from = ?*state, to = ?to, "circuit breaker state transition");
            self.state_transitions.fetch_add(1, Ordering::Relaxed);
            *state = to;
            if to == CircuitState::Open {
                *self.opened_at.lock().unwrap() = Some(Instant::now());
            }
        }
    }
}

impl CircuitBreakerBehavior for CircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> CircuitState {
        *self.state.lock().unwrap()
    }

    fn should_allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = self
                    .opened_at
                    .lock()
                    .unwrap()
                    .map(|at| at.elapsed())
                    .unwrap_or_default();
                if elapsed >= self.config.open_timeout {
                    self.transition(CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self, duration: Duration) {
        let mut counters = self.counters.lock().unwrap();
        counters.total_calls += 1;
        counters.success_count += 1;
        counters.consecutive_failures = 0;
        counters.total_duration += duration;

        if self.state() == CircuitState::HalfOpen {
            counters.half_open_calls += 1;
            counters.half_open_successes += 1;
            if counters.half_open_successes >= self.config.success_threshold {
                drop(counters);
                self.transition(CircuitState::Closed);
            }
        }
    }

    fn record_failure(&self, duration: Duration) {
        let mut counters = self.counters.lock().unwrap();
        counters.total_calls += 1;
        counters.failure_count += 1;
        counters.consecutive_failures += 1;
        counters.total_duration += duration;

        let should_open = match self.state() {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => counters.consecutive_failures >= self.config.failure_threshold,
            CircuitState::Open => false,
        };
        drop(counters);
        if should_open {
            self.transition(CircuitState::Open);
        }
    }

    fn is_healthy(&self) -> bool {
        self.state() != CircuitState::Open
    }

    fn force_open(&self) {
        self.transition(CircuitState::Open);
    }

    fn force_closed(&self) {
        self.transition(CircuitState::Closed);
    }

    fn metrics(&self) -> CircuitBreakerMetrics {
        let counters = self.counters.lock().unwrap();
        let mut metrics = CircuitBreakerMetrics::new();
        metrics.total_calls = counters.total_calls;
        metrics.success_count = counters.success_count;
        metrics.failure_count = counters.failure_count;
        metrics.consecutive_failures = counters.consecutive_failures;
        metrics.half_open_calls = counters.half_open_calls;
        metrics.total_duration = counters.total_duration;
        metrics.current_state = self.state();
        if metrics.total_calls > 0 {
            metrics.failure_rate = metrics.failure_count as f64 / metrics.total_calls as f64;
            metrics.success_rate = metrics.success_count as f64 / metrics.total_calls as f64;
            metrics.average_duration = metrics.total_duration / metrics.total_calls as u32;
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_failure_threshold() {
        let breaker = CircuitBreaker::new(
            "cache",
            CircuitBreakerConfig {
                failure_threshold: 3,
                ..Default::default()
            },
        );
        for _ in 0..2 {
            breaker.record_failure(Duration::from_millis(1));
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure(Duration::from_millis(1));
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.should_allow());
    }

    #[test]
    fn half_open_recovers_to_closed_after_success_threshold() {
        let breaker = CircuitBreaker::new(
            "cache",
            CircuitBreakerConfig {
                failure_threshold: 1,
                success_threshold: 2,
                open_timeout: Duration::from_millis(0),
            },
        );
        breaker.record_failure(Duration::from_millis(1));
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.should_allow());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_success(Duration::from_millis(1));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record_success(Duration::from_millis(1));
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let breaker = CircuitBreaker::new(
            "cache",
            CircuitBreakerConfig {
                failure_threshold: 1,
                open_timeout: Duration::from_millis(0),
                ..Default::default()
            },
        );
        breaker.record_failure(Duration::from_millis(1));
        assert!(breaker.should_allow());
        breaker.record_failure(Duration::from_millis(1));
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
