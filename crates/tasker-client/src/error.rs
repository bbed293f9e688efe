//! Client-side error type.
//!
//! Distinct from [`tasker_shared::errors::TaskerError`]: the engine's
//! error enum models *internal* failure kinds (§7), while a manager
//! client also has to represent the HTTP transport and the manager's
//! own status-code mapping (§6) back to a caller who only has an
//! `http::StatusCode` and a body to go on.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// One variant per §6/§7 status code a manager can return, plus the
/// transport-level failures reqwest can raise before a status code is
/// even available.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no ManagerUrls.{0} configured")]
    NoManagerUrl(String),

    /// §7 `ValidationFailure` — 400.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// §7 `NotFound` — 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// §7 `DuplicateKey` / `ReferenceExists` — 409.
    #[error("conflict: {0}")]
    Conflict(String),

    /// §7 `ValidatorUnavailable` — 503.
    #[error("validator unavailable")]
    ValidatorUnavailable,

    /// Any other non-2xx response, with the status code preserved.
    #[error("manager returned {status}: {body}")]
    Unexpected { status: u16, body: String },
}

impl ClientError {
    /// Map an HTTP status code to the §6/§7 variant it corresponds to,
    /// falling back to [`ClientError::Unexpected`] for anything else.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => ClientError::ValidationFailure(body),
            404 => ClientError::NotFound(body),
            409 => ClientError::Conflict(body),
            503 => ClientError::ValidatorUnavailable,
            other => ClientError::Unexpected { status: other, body },
        }
    }
}
