use axum::http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
struct CachedResponse {
    status: StatusCode,
    body: Value,
    stored_at: Instant,
}

/// Response cache for backend reads, keyed by caller and route string.
///
/// Entries live for a fixed TTL; mutations drop literal keys for every caller
/// since jars are shared between owners. A zero TTL disables caching.
pub struct QueryCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), CachedResponse>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, scope: &str, key: &str) -> Option<(StatusCode, Value)> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        let entry = entries.get(&(scope.to_string(), key.to_string()))?;
        if entry.stored_at.elapsed() >= self.ttl {
            debug!("Cached response is stale");
            return None;
        }

        debug!("Serving cached response");
        Some((entry.status, entry.body.clone()))
    }

    #[instrument(skip(self, body))]
    pub async fn put(&self, scope: &str, key: &str, status: StatusCode, body: Value) {
        if !self.is_enabled() {
            return;
        }

        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            (scope.to_string(), key.to_string()),
            CachedResponse {
                status,
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops the given keys for every caller
    #[instrument(skip(self, keys))]
    pub async fn invalidate<I>(&self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(_, key), _| !keys.contains(key));

        debug!(
            keys = ?keys,
            removed = before - entries.len(),
            "Invalidated cached queries"
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
