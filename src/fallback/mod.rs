//! Persistent fallback store for last-known-good collections.
//!
//! Each collection lives under one fixed key and is only ever replaced as a
//! whole. Entries are written after a successful fetch and read back only
//! when the fetch for that collection failed.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::CollectionKind;

#[cfg(feature = "native")]
mod sqlite;
#[cfg(feature = "native")]
pub use sqlite::SqliteStore;

#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub use local_storage::LocalStorageStore;

/// Synchronous string key-value store. `set` must replace the whole value
/// for a key in a single step.
pub trait FallbackStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Serialized form of a cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot<T> {
    pub saved_at_ms: i64,
    pub items: Vec<T>,
}

#[derive(Serialize)]
struct CachedSnapshotRef<'a, T> {
    saved_at_ms: i64,
    items: &'a [T],
}

/// Replace the cached snapshot for `kind`.
pub fn write_snapshot<T: Serialize>(
    store: &dyn FallbackStore,
    kind: CollectionKind,
    items: &[T],
    saved_at_ms: i64,
) -> Result<()> {
    let entry = CachedSnapshotRef { saved_at_ms, items };
    let raw = serde_json::to_string(&entry)
        .with_context(|| format!("serialize {kind} snapshot"))?;
    store.set(kind.cache_key(), &raw)?;
    log::debug!("[fallback] stored {} {} entries ({} bytes)", items.len(), kind, raw.len());
    Ok(())
}

/// Read the cached snapshot for `kind`. `Ok(None)` means no entry exists;
/// an entry that fails to decode is an error.
pub fn read_snapshot<T: DeserializeOwned>(
    store: &dyn FallbackStore,
    kind: CollectionKind,
) -> Result<Option<CachedSnapshot<T>>> {
    let Some(raw) = store.get(kind.cache_key())? else {
        return Ok(None);
    };
    let entry = serde_json::from_str::<CachedSnapshot<T>>(&raw)
        .with_context(|| format!("decode cached {kind} snapshot"))?;
    Ok(Some(entry))
}

/// Process-local store. Used in tests and wherever nothing durable is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FallbackStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketItem;

    fn item(id: &str, cost: u64) -> MarketItem {
        MarketItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            kind: "bait".to_string(),
            description: "shiny".to_string(),
            cost,
        }
    }

    #[test]
    fn test_missing_entry_reads_as_none() {
        let store = MemoryStore::new();
        let got = read_snapshot::<MarketItem>(&store, CollectionKind::Market).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_snapshot_replaced_as_whole() {
        let store = MemoryStore::new();
        write_snapshot(&store, CollectionKind::Market, &[item("a", 1), item("b", 2)], 10).unwrap();
        write_snapshot(&store, CollectionKind::Market, &[item("c", 3)], 20).unwrap();

        let got = read_snapshot::<MarketItem>(&store, CollectionKind::Market)
            .unwrap()
            .unwrap();
        assert_eq!(got.saved_at_ms, 20);
        assert_eq!(got.items, vec![item("c", 3)]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryStore::new();
        write_snapshot(&store, CollectionKind::Market, &[item("a", 1)], 10).unwrap();
        assert!(store.get("leaderboard").unwrap().is_none());
        assert!(store.get("market").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let store = MemoryStore::new();
        store.set("market", "{not json").unwrap();
        assert!(read_snapshot::<MarketItem>(&store, CollectionKind::Market).is_err());
    }
}
