//! In-memory [`CacheGateway`] backend (feature `test-utils`, §14).
//!
//! Lets the C3/C5/C6 algorithms be exercised deterministically — the
//! six end-to-end scenarios of §8 run against this backend rather than
//! a real Redis/Postgres deployment.

use super::{CacheGateway, CacheValue, MapName};
use crate::errors::CacheError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// A process-local, TTL-aware map-of-maps. Linearisable on
/// `put_if_absent` per key (§8 invariant 5) because `DashMap::entry`
/// takes the shard lock for the whole read-modify-write.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    maps: DashMap<String, DashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, name: &str) -> dashmap::mapref::one::Ref<'_, String, DashMap<String, Entry>> {
        self.maps.entry(name.to_string()).or_default();
        self.maps.get(name).expect("just inserted")
    }
}

#[async_trait]
impl CacheGateway for InMemoryCache {
    async fn get(&self, map: MapName<'_>, key: &str) -> Result<Option<CacheValue>, CacheError> {
        let m = self.map(map);
        match m.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            Some(_) => {
                drop(m);
                self.maps.get(map).unwrap().remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        map: MapName<'_>,
        key: &str,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let m = self.map(map);
        m.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn put_if_absent(
        &self,
        map: MapName<'_>,
        key: &str,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> Result<Option<CacheValue>, CacheError> {
        let m = self.map(map);
        let expires_at = ttl.map(|d| Instant::now() + d);
        let mut conflict = None;
        m.entry(key.to_string())
            .and_modify(|existing| {
                if existing.is_expired() {
                    *existing = Entry {
                        value: value.clone(),
                        expires_at,
                    };
                } else {
                    conflict = Some(existing.value.clone());
                }
            })
            .or_insert_with(|| Entry {
                value: value.clone(),
                expires_at,
            });
        Ok(conflict)
    }

    async fn remove(&self, map: MapName<'_>, key: &str) -> Result<(), CacheError> {
        let m = self.map(map);
        m.remove(key);
        Ok(())
    }

    async fn exists(&self, map: MapName<'_>, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(map, key).await?.is_some())
    }

    async fn get_all_entries(
        &self,
        map: MapName<'_>,
    ) -> Result<Vec<(String, CacheValue)>, CacheError> {
        let m = self.map(map);
        Ok(m
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .map(|entry| (entry.key().clone(), entry.value().value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_if_absent_is_linearisable_under_concurrent_writers() {
        let cache = std::sync::Arc::new(InMemoryCache::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .put_if_absent("files", "same-path", vec![i], None)
                    .await
                    .unwrap()
            }));
        }
        let mut absent_count = 0;
        for handle in handles {
            if handle.await.unwrap().is_none() {
                absent_count += 1;
            }
        }
        assert_eq!(absent_count, 1, "exactly one writer should observe absence");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let cache = InMemoryCache::new();
        cache.set("m", "k", vec![1, 2, 3], None).await.unwrap();
        cache.remove("m", "k").await.unwrap();
        cache.remove("m", "k").await.unwrap();
        assert!(!cache.exists("m", "k").await.unwrap());
    }

    #[tokio::test]
    async fn ttl_expires_entries() {
        let cache = InMemoryCache::new();
        cache
            .set("m", "k", vec![1], Some(Duration::from_millis(5)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("m", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_all_entries_excludes_expired() {
        let cache = InMemoryCache::new();
        cache.set("m", "live", vec![1], None).await.unwrap();
        cache
            .set("m", "dead", vec![2], Some(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let entries = cache.get_all_entries("m").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "live");
    }
}
