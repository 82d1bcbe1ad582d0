//! Cart mutations: read the stored cart, change it, write it back.
//!
//! Each operation takes the store explicitly and does one full
//! read-modify-write. That is only safe with a single writer per visitor,
//! which is what the session gives us; concurrent tabs are last-writer-wins.
//!
//! Out-of-range indices are not errors. The operation reports
//! [`Mutation::Ignored`] and nothing is written.

use chrono::{DateTime, Utc};

use sleep_outside_core::Quantity;

use super::item::{CartLineItem, NewLineItem};
use super::model::AddOutcome;
use super::store::{CartStore, KeyValueStore, StoreError};

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The line at `index` now holds `quantity`.
    Updated { index: usize, quantity: Quantity },
    /// The line at `index` was already at the limit; nothing was persisted.
    Unchanged { index: usize, quantity: Quantity },
    /// The index did not name a line; nothing was persisted.
    Ignored,
}

/// A line taken out of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The removed line as it was stored.
    pub item: CartLineItem,
    /// Where it was.
    pub index: usize,
}

/// Add one unit of a product, merging with an existing line.
///
/// # Errors
///
/// Returns [`StoreError`] if the cart cannot be written.
pub async fn add_item<S: KeyValueStore>(
    store: &CartStore<S>,
    product: NewLineItem,
    now: DateTime<Utc>,
) -> Result<AddOutcome, StoreError> {
    let mut cart = store.load().await;
    let product_id = product.id.clone();
    let outcome = cart.add(product, now);
    store.save(&cart).await?;

    tracing::info!(
        product_id = %product_id,
        lines = cart.len(),
        total_items = cart.total_items(),
        "Product added to cart"
    );
    Ok(outcome)
}

/// Set the quantity of the line at `index`, clamped to 1..=10.
///
/// # Errors
///
/// Returns [`StoreError`] if the cart cannot be written.
pub async fn set_quantity<S: KeyValueStore>(
    store: &CartStore<S>,
    index: usize,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<Mutation, StoreError> {
    let mut cart = store.load().await;
    let Some(quantity) = cart.set_quantity(index, quantity, now) else {
        tracing::debug!(index, lines = cart.len(), "Ignoring quantity for missing line");
        return Ok(Mutation::Ignored);
    };
    store.save(&cart).await?;
    Ok(Mutation::Updated { index, quantity })
}

/// Change the quantity of the line at `index` by `delta`, clamped to 1..=10.
///
/// # Errors
///
/// Returns [`StoreError`] if the cart cannot be written.
pub async fn change_quantity_by<S: KeyValueStore>(
    store: &CartStore<S>,
    index: usize,
    delta: i64,
    now: DateTime<Utc>,
) -> Result<Mutation, StoreError> {
    let mut cart = store.load().await;
    let Some(previous) = cart.get(index).map(|item| item.quantity) else {
        tracing::debug!(index, lines = cart.len(), "Ignoring adjustment for missing line");
        return Ok(Mutation::Ignored);
    };
    let Some(quantity) = cart.change_quantity_by(index, delta, now) else {
        return Ok(Mutation::Ignored);
    };
    if quantity == previous {
        tracing::debug!(index, quantity = quantity.get(), "Quantity already at limit");
        return Ok(Mutation::Unchanged { index, quantity });
    }
    store.save(&cart).await?;
    Ok(Mutation::Updated { index, quantity })
}

/// Remove the line at `index`.
///
/// Returns `None` when there is no such line; nothing is persisted then.
///
/// # Errors
///
/// Returns [`StoreError`] if the cart cannot be written.
pub async fn remove_item<S: KeyValueStore>(
    store: &CartStore<S>,
    index: usize,
) -> Result<Option<Removal>, StoreError> {
    let mut cart = store.load().await;
    let Some(item) = cart.remove(index) else {
        tracing::debug!(index, lines = cart.len(), "Ignoring removal of missing line");
        return Ok(None);
    };
    store.save(&cart).await?;

    tracing::info!(product_id = %item.id, index, "Product removed from cart");
    Ok(Some(Removal { item, index }))
}

/// Empty the cart (checkout confirmed).
///
/// # Errors
///
/// Returns [`StoreError`] if the cart cannot be written.
pub async fn clear_cart<S: KeyValueStore>(store: &CartStore<S>) -> Result<(), StoreError> {
    store.clear().await?;
    tracing::info!("Cart cleared");
    Ok(())
}

/// Parse an index posted by a rendered control.
///
/// Anything that is not a non-negative integer yields `None`, which callers
/// treat like an out-of-range index.
#[must_use]
pub fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}

/// Parse a typed quantity from its leading integer, so `4.5` and `3abc` read
/// as 4 and 3. `None` when the input does not start with a number.
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let sign = usize::from(raw.starts_with(['-', '+']));
    let end = raw
        .char_indices()
        .skip(sign)
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw.len(), |(i, _)| i);
    raw.get(..end)?.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use sleep_outside_core::ProductId;

    use super::*;
    use crate::cart::store::{CART_KEY, MemoryStore};

    fn product(id: &str) -> NewLineItem {
        NewLineItem {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            brand: String::new(),
            unit_price: Decimal::from(50),
            image_url: None,
            color_name: None,
        }
    }

    async fn stored_text(store: &CartStore<MemoryStore>) -> Option<String> {
        store.storage().get_item(CART_KEY).await.unwrap()
    }

    async fn seeded(ids: &[&str]) -> CartStore<MemoryStore> {
        let store = CartStore::new(MemoryStore::new());
        for id in ids {
            add_item(&store, product(id), Utc::now()).await.unwrap();
        }
        store
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[tokio::test]
    async fn test_add_persists_and_merges() {
        let store = seeded(&["A"]).await;

        let outcome = add_item(&store, product("A"), Utc::now()).await.unwrap();

        assert_eq!(
            outcome,
            AddOutcome::Merged {
                index: 0,
                quantity: Quantity::clamped(2)
            }
        );
        let cart = store.load().await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(0).unwrap().extended_price(), Decimal::from(100));
    }

    #[tokio::test]
    async fn test_set_quantity_persists() {
        let store = seeded(&["A", "B"]).await;

        let result = set_quantity(&store, 1, 7, Utc::now()).await.unwrap();

        assert_eq!(
            result,
            Mutation::Updated {
                index: 1,
                quantity: Quantity::clamped(7)
            }
        );
        assert_eq!(store.load().await.get(1).unwrap().quantity.get(), 7);
    }

    #[tokio::test]
    async fn test_out_of_range_does_not_persist() {
        let store = seeded(&["A"]).await;
        let before = stored_text(&store).await;

        assert_eq!(
            set_quantity(&store, 1, 3, Utc::now()).await.unwrap(),
            Mutation::Ignored
        );
        assert_eq!(
            change_quantity_by(&store, 9, 1, Utc::now()).await.unwrap(),
            Mutation::Ignored
        );
        assert!(remove_item(&store, 1).await.unwrap().is_none());

        assert_eq!(stored_text(&store).await, before);
    }

    #[tokio::test]
    async fn test_adjust_at_limit_writes_nothing() {
        let store = seeded(&["A"]).await;
        let before = stored_text(&store).await;

        assert_eq!(
            change_quantity_by(&store, 0, -1, Utc::now()).await.unwrap(),
            Mutation::Unchanged {
                index: 0,
                quantity: Quantity::MIN
            }
        );
        assert_eq!(stored_text(&store).await, before);

        set_quantity(&store, 0, 10, Utc::now()).await.unwrap();
        assert_eq!(
            change_quantity_by(&store, 0, 1, Utc::now()).await.unwrap(),
            Mutation::Unchanged {
                index: 0,
                quantity: Quantity::MAX
            }
        );
    }

    #[tokio::test]
    async fn test_out_of_range_on_empty_store_writes_nothing() {
        let store = CartStore::new(MemoryStore::new());

        assert_eq!(
            set_quantity(&store, 0, 3, Utc::now()).await.unwrap(),
            Mutation::Ignored
        );
        assert!(stored_text(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_returns_line_and_index() {
        let store = seeded(&["A", "B", "C"]).await;

        let removal = remove_item(&store, 1).await.unwrap().unwrap();

        assert_eq!(removal.index, 1);
        assert_eq!(removal.item.id.as_str(), "B");
        let cart = store.load().await;
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(1).unwrap().id.as_str(), "C");
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let store = seeded(&["A", "B"]).await;
        clear_cart(&store).await.unwrap();
        assert!(store.load().await.is_empty());
        assert_eq!(stored_text(&store).await.as_deref(), Some("[]"));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("3"), Some(3));
        assert_eq!(parse_index(" 0 "), Some(0));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("two"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("4"), Some(4));
        assert_eq!(parse_quantity("-2"), Some(-2));
        assert_eq!(parse_quantity("4.5"), Some(4));
        assert_eq!(parse_quantity("3abc"), Some(3));
        assert_eq!(parse_quantity(" +7 "), Some(7));
        assert_eq!(parse_quantity("-"), None);
        assert_eq!(parse_quantity(".5"), None);
        assert_eq!(parse_quantity("lots"), None);
        assert_eq!(parse_quantity(""), None);
    }

    proptest! {
        #[test]
        fn adds_merge_by_id(picks in prop::collection::vec(0usize..5, 0..40)) {
            let ids = ["A", "B", "C", "D", "E"];
            let cart = block_on(async {
                let store = CartStore::new(MemoryStore::new());
                for pick in &picks {
                    add_item(&store, product(ids[*pick]), Utc::now()).await.unwrap();
                }
                store.load().await
            });

            let mut counts: HashMap<&str, i64> = HashMap::new();
            for pick in &picks {
                *counts.entry(ids[*pick]).or_insert(0) += 1;
            }

            prop_assert_eq!(cart.len(), counts.len());
            for item in cart.items() {
                let expected = counts[item.id.as_str()].min(10);
                prop_assert_eq!(i64::from(item.quantity.get()), expected);
            }
        }

        #[test]
        fn quantity_changes_stay_in_range(
            ops in prop::collection::vec((any::<bool>(), -50i64..50), 1..30)
        ) {
            let store = block_on(seeded(&["A"]));
            for (absolute, value) in ops {
                let result = block_on(async {
                    if absolute {
                        set_quantity(&store, 0, value, Utc::now()).await
                    } else {
                        change_quantity_by(&store, 0, value, Utc::now()).await
                    }
                })
                .unwrap();

                let (Mutation::Updated { quantity, .. } | Mutation::Unchanged { quantity, .. }) = result
                else {
                    return Err(TestCaseError::fail("index 0 must exist"));
                };
                prop_assert!((1..=10).contains(&quantity.get()));
            }
        }
    }
}
