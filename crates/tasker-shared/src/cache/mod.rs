//! Cache Gateway (C1, §4.1) — a named-map key/value store abstraction.
//!
//! Mirrors the shape `tasker-shared::messaging` used for the Bus
//! Gateway in the source corpus: an enum-dispatched `MessagingProvider`
//! behind a thin domain facade, with `async-trait` used only at the
//! trait boundary. Here `CacheProvider` plays the analogous role.

pub mod in_memory;
pub mod key;

use crate::errors::CacheError;
use async_trait::async_trait;
use std::time::Duration;

pub use in_memory::InMemoryCache;
pub use key::{ActivityDataKey, FileRegistrationKey};

/// Named cache maps referenced by name throughout the engine (§6
/// "Cache maps"); kept as `&str` rather than an enum so operators can
/// point `ManagerConfiguration`-style config at arbitrary map names
/// without a code change, matching `*.MapName`/`*.CacheMapName` config
/// keys in §6.
pub type MapName<'a> = &'a str;

/// A single cache entry with its raw bytes.
pub type CacheValue = Vec<u8>;

/// Operations of §4.1, generic over an opaque UTF-8-or-binary key.
///
/// All operations may fail with [`CacheError::Unavailable`] (transient,
/// retryable) or [`CacheError::Timeout`] (transient, retryable);
/// `put_if_absent` may additionally fail with [`CacheError::Conflict`]
/// (never retryable — the write lost the race).
#[async_trait]
pub trait CacheGateway: Send + Sync + std::fmt::Debug {
    async fn get(&self, map: MapName<'_>, key: &str) -> Result<Option<CacheValue>, CacheError>;

    async fn set(
        &self,
        map: MapName<'_>,
        key: &str,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    /// Atomic: returns `Ok(None)` iff the key was absent and the write
    /// succeeded; returns `Ok(Some(prior))` if the key was already
    /// present (the write did not happen).
    async fn put_if_absent(
        &self,
        map: MapName<'_>,
        key: &str,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> Result<Option<CacheValue>, CacheError>;

    async fn remove(&self, map: MapName<'_>, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, map: MapName<'_>, key: &str) -> Result<bool, CacheError>;

    async fn get_all_entries(
        &self,
        map: MapName<'_>,
    ) -> Result<Vec<(String, CacheValue)>, CacheError>;
}

/// Typed helper methods layered on [`CacheGateway`] for the two key
/// shapes §4.1/§6 name explicitly: processor-activity-data blobs and
/// the orchestration model document. Kept as an extension trait so any
/// backend automatically gains them.
#[async_trait]
pub trait CacheGatewayExt: CacheGateway {
    async fn get_activity_data(
        &self,
        map: MapName<'_>,
        key: &ActivityDataKey,
    ) -> Result<Option<CacheValue>, CacheError> {
        self.get(map, &key.to_string()).await
    }

    async fn set_activity_data(
        &self,
        map: MapName<'_>,
        key: &ActivityDataKey,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.set(map, &key.to_string(), value, ttl).await
    }

    async fn remove_activity_data(
        &self,
        map: MapName<'_>,
        key: &ActivityDataKey,
    ) -> Result<(), CacheError> {
        self.remove(map, &key.to_string()).await
    }

    async fn register_file_once(
        &self,
        map: MapName<'_>,
        key: &FileRegistrationKey,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let prior = self
            .put_if_absent(map, &key.to_string(), Vec::new(), ttl)
            .await?;
        Ok(prior.is_none())
    }
}

impl<T: CacheGateway + ?Sized> CacheGatewayExt for T {}
