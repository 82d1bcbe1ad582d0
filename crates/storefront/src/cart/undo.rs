//! Undo for removed cart lines.
//!
//! A removal is remembered (line, original index, token, expiry) in the
//! visitor's storage under [`UNDO_KEY`]. Only the latest removal can be
//! undone, and only until it expires.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::CartLineItem;
use super::ops::Removal;
use super::store::{CartStore, KeyValueStore, StoreError};
use crate::feedback::REMOVAL_BANNER_LIFETIME;

/// Key of the pending undo entry.
pub const UNDO_KEY: &str = "so-cart-undo";

/// How long a removal can be undone: the banner's lifetime plus two seconds
/// for the click to arrive.
#[must_use]
pub fn undo_window() -> Duration {
    Duration::milliseconds(
        i64::try_from(REMOVAL_BANNER_LIFETIME.as_millis()).unwrap_or(i64::MAX) + 2_000,
    )
}

/// A removal that can still be reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    pub token: Uuid,
    pub item: CartLineItem,
    pub index: usize,
    pub expires_at: DateTime<Utc>,
}

/// Result of an undo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The line is back at `index`.
    Restored { item: CartLineItem, index: usize },
    /// The token matched but the window has passed.
    Expired,
    /// No pending removal with that token.
    NotFound,
}

/// Remember a removal so it can be undone.
///
/// Replaces any earlier pending removal.
///
/// # Errors
///
/// Returns [`StoreError`] if the entry cannot be written.
pub async fn remember_removal<S: KeyValueStore>(
    store: &CartStore<S>,
    removal: Removal,
    now: DateTime<Utc>,
) -> Result<UndoEntry, StoreError> {
    let entry = UndoEntry {
        token: Uuid::new_v4(),
        item: removal.item,
        index: removal.index,
        expires_at: now + undo_window(),
    };
    store
        .storage()
        .set_item(UNDO_KEY, serde_json::to_string(&entry)?)
        .await?;
    Ok(entry)
}

/// Put back the removal identified by `token`.
///
/// The pending entry is consumed whenever the token matches, whether or not
/// it was still in time.
///
/// # Errors
///
/// Returns [`StoreError`] if storage fails.
pub async fn undo_removal<S: KeyValueStore>(
    store: &CartStore<S>,
    token: Uuid,
    now: DateTime<Utc>,
) -> Result<UndoOutcome, StoreError> {
    let Some(entry) = pending(store).await? else {
        return Ok(UndoOutcome::NotFound);
    };
    if entry.token != token {
        return Ok(UndoOutcome::NotFound);
    }

    store.storage().remove_item(UNDO_KEY).await?;
    if now > entry.expires_at {
        tracing::debug!(%token, "Undo requested after window closed");
        return Ok(UndoOutcome::Expired);
    }

    let mut cart = store.load().await;
    let index = cart.restore(entry.item.clone(), entry.index);
    store.save(&cart).await?;

    tracing::info!(product_id = %entry.item.id, index, "Removed product restored");
    Ok(UndoOutcome::Restored {
        item: entry.item,
        index,
    })
}

async fn pending<S: KeyValueStore>(store: &CartStore<S>) -> Result<Option<UndoEntry>, StoreError> {
    let Some(text) = store.storage().get_item(UNDO_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(entry) => Ok(Some(entry)),
        Err(e) => {
            tracing::warn!("Discarding unreadable undo entry: {e}");
            store.storage().remove_item(UNDO_KEY).await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use sleep_outside_core::ProductId;

    use super::*;
    use crate::cart::item::NewLineItem;
    use crate::cart::ops;
    use crate::cart::store::MemoryStore;

    fn product(id: &str) -> NewLineItem {
        NewLineItem {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            brand: String::new(),
            unit_price: Decimal::from(10),
            image_url: None,
            color_name: None,
        }
    }

    async fn seeded(ids: &[&str]) -> CartStore<MemoryStore> {
        let store = CartStore::new(MemoryStore::new());
        for id in ids {
            ops::add_item(&store, product(id), Utc::now()).await.unwrap();
        }
        store
    }

    fn ids(cart: &crate::cart::Cart) -> Vec<String> {
        cart.items().iter().map(|item| item.id.to_string()).collect()
    }

    #[test]
    fn test_window_outlasts_banner() {
        assert_eq!(undo_window(), Duration::seconds(5));
    }

    #[tokio::test]
    async fn test_undo_restores_original_position() {
        let store = seeded(&["A", "B", "C"]).await;
        let now = Utc::now();
        let removal = ops::remove_item(&store, 1).await.unwrap().unwrap();
        let entry = remember_removal(&store, removal, now).await.unwrap();

        let outcome = undo_removal(&store, entry.token, now + Duration::seconds(1))
            .await
            .unwrap();

        assert!(matches!(outcome, UndoOutcome::Restored { index: 1, .. }));
        assert_eq!(ids(&store.load().await), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_undo_is_single_use() {
        let store = seeded(&["A"]).await;
        let now = Utc::now();
        let removal = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let entry = remember_removal(&store, removal, now).await.unwrap();

        undo_removal(&store, entry.token, now).await.unwrap();
        let again = undo_removal(&store, entry.token, now).await.unwrap();

        assert_eq!(again, UndoOutcome::NotFound);
        assert_eq!(store.load().await.total_items(), 1);
    }

    #[tokio::test]
    async fn test_undo_after_window_expires() {
        let store = seeded(&["A"]).await;
        let now = Utc::now();
        let removal = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let entry = remember_removal(&store, removal, now).await.unwrap();

        let outcome = undo_removal(&store, entry.token, now + Duration::seconds(6))
            .await
            .unwrap();

        assert_eq!(outcome, UndoOutcome::Expired);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_token_is_not_found() {
        let store = seeded(&["A"]).await;
        let now = Utc::now();
        let removal = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let entry = remember_removal(&store, removal, now).await.unwrap();

        let outcome = undo_removal(&store, Uuid::new_v4(), now).await.unwrap();
        assert_eq!(outcome, UndoOutcome::NotFound);

        // The real token still works.
        let outcome = undo_removal(&store, entry.token, now).await.unwrap();
        assert!(matches!(outcome, UndoOutcome::Restored { .. }));
    }

    #[tokio::test]
    async fn test_newer_removal_replaces_pending() {
        let store = seeded(&["A", "B"]).await;
        let now = Utc::now();
        let first = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let first = remember_removal(&store, first, now).await.unwrap();
        let second = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let second = remember_removal(&store, second, now).await.unwrap();

        assert_eq!(
            undo_removal(&store, first.token, now).await.unwrap(),
            UndoOutcome::NotFound
        );
        assert!(matches!(
            undo_removal(&store, second.token, now).await.unwrap(),
            UndoOutcome::Restored { .. }
        ));
        assert_eq!(ids(&store.load().await), ["B"]);
    }

    #[tokio::test]
    async fn test_undo_merges_when_product_was_readded() {
        let store = seeded(&["A"]).await;
        let now = Utc::now();
        let removal = ops::remove_item(&store, 0).await.unwrap().unwrap();
        let entry = remember_removal(&store, removal, now).await.unwrap();
        ops::add_item(&store, product("A"), now).await.unwrap();

        undo_removal(&store, entry.token, now).await.unwrap();

        let cart = store.load().await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_not_found() {
        let store = seeded(&["A"]).await;
        store
            .storage()
            .set_item(UNDO_KEY, "nope".to_string())
            .await
            .unwrap();

        let outcome = undo_removal(&store, Uuid::new_v4(), Utc::now()).await.unwrap();

        assert_eq!(outcome, UndoOutcome::NotFound);
        assert!(store.storage().get_item(UNDO_KEY).await.unwrap().is_none());
    }
}
