//! Crate-wide error surface (§7).
//!
//! `CacheError` and `BusError` are the narrow, per-gateway error kinds
//! described in §4.1/§4.2; they convert into the broader [`TaskerError`]
//! via `#[from]` so call sites inside C1/C2 keep precise error types while
//! consumers of the engine (C5/C6, the CLI, the HTTP surface) see one
//! error enum with a well-defined HTTP status mapping.

use thiserror::Error;

/// Errors raised by a [`crate::cache::CacheGateway`] implementation (§4.1).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Transient: the backend could not be reached. Always retryable.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// Transient: the call exceeded its per-call deadline. Retryable.
    #[error("cache operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// `PutIfAbsent` lost the race to a concurrent writer. Never retryable.
    #[error("key already present, PutIfAbsent conflict")]
    Conflict,
}

/// Errors raised by a [`crate::bus::BusGateway`] implementation (§4.2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("bus backend unavailable: {0}")]
    Unavailable(String),

    #[error("bus operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// One error enum for the whole workspace (§7, §12).
///
/// Row-for-row mapping against the §7 error-kind table; the HTTP-status
/// mapping lives with the (out-of-scope) entity managers but is recorded
/// here for `tasker-client`/`tasker-ctl` to reconstruct when talking to
/// them.
#[derive(Debug, Error)]
pub enum TaskerError {
    /// §7 `ValidationFailure` — 400, no recovery.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// §7 `NotFound` — 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// §7 `DuplicateKey` — 409.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// §7 `ReferenceExists` — 409, with a referring-entity hint.
    #[error("referenced by {referring_entity}: cannot mutate {target}")]
    ReferenceExists {
        target: String,
        referring_entity: String,
    },

    /// §7 `ValidatorUnavailable` — 503, fail-safe reject.
    #[error("schema validator unavailable")]
    ValidatorUnavailable,

    /// §7 `BusUnavailable` — retried with bounded exponential backoff.
    #[error(transparent)]
    BusUnavailable(#[from] BusError),

    /// §7 `CacheUnavailable` — retried with bounded exponential backoff.
    #[error(transparent)]
    CacheUnavailable(#[from] CacheError),

    /// §4.3 strict precondition: the consumer read `⊥` for the flow's
    /// [`crate::domain::OrchestrationCacheModel`]. Fatal for this event,
    /// no retry (§8 invariant 4).
    #[error("orchestration model missing for flow {0}")]
    OrchestrationModelMissing(String),

    /// §4.5 step 2: `frame.stepId` is absent from the loaded model. Fatal.
    #[error("step {0} unknown in orchestration model")]
    StepUnknown(String),

    /// §4.6: the bound plugin did not honour `executionTimeoutMs`.
    #[error("plugin execution timed out after {0:?}")]
    PluginTimeout(std::time::Duration),

    /// §4.6: the bound plugin raised, including validation failures.
    #[error("plugin execution failed: {0}")]
    PluginException(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TaskerError {
    /// Whether the bus retry policy should redeliver the originating
    /// message after this error (§7 propagation policy).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskerError::BusUnavailable(_) | TaskerError::CacheUnavailable(_)
        )
    }
}

pub type TaskerResult<T> = Result<T, TaskerError>;
