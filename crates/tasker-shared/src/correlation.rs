//! Correlation-id propagation (§6 "Correlation", §9 "Global mutable
//! state").
//!
//! Modeled as task-local storage with explicit `set`/`get`/`try_get`/
//! `clear`, per §9's design note — the Rust analogue of an
//! `AsyncLocal<T>`. Propagation across the bus uses a header field
//! ([`HEADER_NAME`]); propagation across the cache uses an explicit
//! context parameter on each call rather than ambient state, since
//! cache calls in this codebase are plain function calls, not a
//! middleware pipeline.

use crate::ids::CorrelationId;

tokio::task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Default header name carrying the correlation id end-to-end (§6).
pub const HEADER_NAME: &str = "X-Correlation-ID";

/// Run `f` with `id` set as the ambient correlation id for the
/// duration of the future.
pub async fn scope<F, T>(id: CorrelationId, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    CORRELATION_ID.scope(id, f).await
}

/// The ambient correlation id, or a fresh one if none is set — used at
/// entry points (the HTTP start API, the Scheduler's own flow starts)
/// that must always have one.
pub fn get_or_generate() -> CorrelationId {
    try_get().unwrap_or_default()
}

/// The ambient correlation id, if a [`scope`] is currently active.
pub fn try_get() -> Option<CorrelationId> {
    CORRELATION_ID.try_with(|id| *id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_establishes_and_clears_ambient_value() {
        assert_eq!(try_get(), None);
        let id = CorrelationId::new();
        let observed = scope(id, async { try_get() }).await;
        assert_eq!(observed, Some(id));
        assert_eq!(try_get(), None);
    }
}
