//! Persistent cart storage.
//!
//! The cart lives in a per-visitor key/value store as a JSON array under
//! [`CART_KEY`]. Reads never fail: anything unreadable is treated as an
//! absent cart, which is an empty cart.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use super::legacy::decode_cart;
use super::model::Cart;

/// Key of the canonical cart.
pub const CART_KEY: &str = "so-cart";

/// Key the product listing used to write its own cart shape under.
pub const LEGACY_CART_KEY: &str = "cart";

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Session backend failed.
    #[error("session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Value could not be encoded.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage scoped to one visitor.
///
/// Modelled on browser local storage: values are opaque strings, a missing
/// key reads as `None`, and there is one writer at a time.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`.
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write `value` under `key`.
    fn set_item(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete `key` if present.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process storage, used by tests and tooling.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Reads and writes the cart in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Wrap a storage backend.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the cart.
    ///
    /// Falls back to the legacy key when the canonical key holds nothing
    /// usable, and to an empty cart after that.
    pub async fn load(&self) -> Cart {
        if let Some(cart) = self.read(CART_KEY).await {
            return cart;
        }
        self.read(LEGACY_CART_KEY).await.unwrap_or_default()
    }

    /// Persist the full cart under the canonical key.
    ///
    /// Also drops the legacy key, so after the first write only one
    /// representation remains.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    pub async fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(cart.items())?;
        self.storage.set_item(CART_KEY, encoded).await?;
        self.storage.remove_item(LEGACY_CART_KEY).await
    }

    /// Create an empty cart if the visitor has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if self.storage.get_item(CART_KEY).await?.is_some()
            || self.storage.get_item(LEGACY_CART_KEY).await?.is_some()
        {
            return Ok(());
        }
        tracing::debug!("Cart initialized");
        self.storage.set_item(CART_KEY, "[]".to_owned()).await
    }

    /// Replace the cart with an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.save(&Cart::default()).await
    }

    async fn read(&self, key: &str) -> Option<Cart> {
        let text = match self.storage.get_item(key).await {
            Ok(text) => text?,
            Err(e) => {
                tracing::warn!(key, "Failed to read cart storage: {e}");
                return None;
            }
        };

        match decode_cart(&text) {
            Ok(cart) => Some(cart),
            Err(e) => {
                tracing::warn!(key, "Ignoring unreadable stored cart: {e}");
                None
            }
        }
    }
}
