//! Versioned In-Memory Document Store
//!
//! The reference persistence adapter: opaque JSON documents keyed by
//! string, each carrying a monotonic version counter and a TTL. Writers
//! must present the version they read; a stale version is rejected instead
//! of silently overwritten, which is what turns racing read-modify-write
//! cycles into retriable conflicts rather than lost updates.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Recommended document lifetime: abandoned games expire after a day.
pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

/// Storage failures surfaced to the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No live document under the key (never written, or expired).
    #[error("no document stored under {key}")]
    NotFound {
        /// The key that was requested.
        key: String,
    },

    /// A compare-and-swap lost the race: someone wrote a newer version.
    #[error("stale write to {key}: held version {held}, store has {current}")]
    Conflict {
        /// The key being written.
        key: String,
        /// Version the writer read before mutating.
        held: u64,
        /// Version currently in the store.
        current: u64,
    },
}

/// A document read, paired with the version a later write must present.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// The stored JSON document.
    pub value: Value,
    /// Monotonic version counter at read time.
    pub version: u64,
}

#[derive(Debug, Clone)]
struct Stored {
    value: Value,
    version: u64,
    expires_at: DateTime<Utc>,
}

/// In-memory store over a `RwLock`-guarded map.
///
/// A single instance is shared by every client actor in the process; an
/// external key-value store with the same get/put/CAS contract can replace
/// it without touching the engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Stored>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the live document under `key`.
    ///
    /// Expired entries are evicted on the way out and reported as
    /// [`StoreError::NotFound`].
    pub async fn get(&self, key: &str) -> Result<Versioned, StoreError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(stored) if stored.expires_at > now => Ok(Versioned {
                value: stored.value.clone(),
                version: stored.version,
            }),
            Some(_) => {
                debug!(key, "evicting expired document");
                entries.remove(key);
                Err(StoreError::NotFound {
                    key: key.to_string(),
                })
            }
            None => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Write `value` under `key` unconditionally, returning the new version.
    ///
    /// Used for initial creation and host-forced overwrites; concurrent
    /// mutators should go through [`MemoryStore::compare_and_swap`].
    pub async fn put(&self, key: &str, value: Value, ttl_secs: i64) -> u64 {
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);
        let mut entries = self.entries.write().await;
        let next_version = entries.get(key).map(|s| s.version + 1).unwrap_or(1);
        entries.insert(
            key.to_string(),
            Stored {
                value,
                version: next_version,
                expires_at,
            },
        );
        next_version
    }

    /// Replace the document under `key` only if `held_version` is current.
    ///
    /// Returns the new version on success. A mismatch returns
    /// [`StoreError::Conflict`] and leaves the stored document untouched;
    /// the caller re-reads and retries.
    pub async fn compare_and_swap(
        &self,
        key: &str,
        held_version: u64,
        value: Value,
        ttl_secs: i64,
    ) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let Some(stored) = entries.get_mut(key) else {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        };
        if stored.expires_at <= now {
            entries.remove(key);
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        if stored.version != held_version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                held: held_version,
                current: stored.version,
            });
        }
        stored.version += 1;
        stored.value = value;
        stored.expires_at = now + Duration::seconds(ttl_secs);
        Ok(stored.version)
    }

    /// Remove the document under `key`. Returns whether one existed.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every expired entry, returning how many were evicted.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| stored.expires_at > now);
        before - entries.len()
    }

    /// Number of live (non-expired) documents.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|s| s.expires_at > now)
            .count()
    }

    /// Whether the store holds no live documents.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
