//! Browser localStorage fallback store (wasm32 + dom-web).

use anyhow::{anyhow, Result};

use super::FallbackStore;

/// Stores entries as `"{prefix}.{key}"` in `window.localStorage`.
///
/// The storage handle is looked up on every call so the store itself stays
/// `Send + Sync`.
pub struct LocalStorageStore {
    prefix: String,
}

impl LocalStorageStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage() -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        window
            .local_storage()
            .map_err(|e| anyhow!("localStorage unavailable: {e:?}"))?
            .ok_or_else(|| anyhow!("localStorage unavailable"))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}.{}", self.prefix, key)
    }
}

impl FallbackStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(&self.full_key(key))
            .map_err(|e| anyhow!("localStorage get failed: {e:?}"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(&self.full_key(key), value)
            .map_err(|e| anyhow!("localStorage set failed: {e:?}"))
    }
}
