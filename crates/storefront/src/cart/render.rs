//! Cart rendering pipeline: stored cart to view model.
//!
//! [`render`] is pure. [`render_cart`] reloads the store first, so every
//! render reflects what is persisted, then announces the new state on
//! [`CartEvents`]. Templates consume the resulting [`CartView`] and do no math.

use rust_decimal::Decimal;

use sleep_outside_core::{Price, round_cents};

use super::events::{CartChanged, CartEvents};
use super::model::Cart;
use super::store::{CartStore, KeyValueStore};

/// Sales tax applied to the subtotal (6%).
pub const TAX_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping fee below the threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    /// Position in the cart, posted back by the line's controls.
    pub index: usize,
    pub id: String,
    pub name: String,
    pub brand: String,
    pub color_name: Option<String>,
    pub image_url: String,
    pub unit_price: Price,
    pub quantity: u8,
    pub extended_price: Price,
    /// Whether the "-" control is enabled.
    pub can_decrease: bool,
    /// Whether the "+" control is enabled.
    pub can_increase: bool,
}

/// Order summary figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
}

impl CartSummary {
    /// Derive tax, shipping, and total from a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal, item_count: u32) -> Self {
        let tax = round_cents(subtotal * TAX_RATE);
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        Self {
            item_count,
            subtotal: Price::usd(subtotal),
            tax: Price::usd(tax),
            shipping: Price::usd(shipping),
            total: Price::usd(subtotal + tax + shipping),
        }
    }

    /// Whether shipping is free.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Header item-count badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartBadge {
    pub count: u32,
}

impl CartBadge {
    /// Hidden when the cart is empty.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.count > 0
    }
}

/// Everything the cart page shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartView {
    pub lines: Vec<LineView>,
    /// `None` for the empty-cart variant, which has no summary panel.
    pub summary: Option<CartSummary>,
    pub badge: CartBadge,
}

impl CartView {
    /// Whether to show the empty-cart variant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Build the view model for a cart.
#[must_use]
pub fn render(cart: &Cart) -> CartView {
    let badge = CartBadge {
        count: cart.total_items(),
    };

    if cart.is_empty() {
        return CartView {
            lines: Vec::new(),
            summary: None,
            badge,
        };
    }

    let lines = cart
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| LineView {
            index,
            id: item.id.to_string(),
            name: item.name.clone(),
            brand: item.brand.clone(),
            color_name: item.color_name.clone(),
            image_url: item.image_url.clone(),
            unit_price: Price::usd(item.unit_price),
            quantity: item.quantity.get(),
            extended_price: Price::usd(item.extended_price()),
            can_decrease: item.quantity.can_decrease(),
            can_increase: item.quantity.can_increase(),
        })
        .collect();

    CartView {
        lines,
        summary: Some(CartSummary::from_subtotal(cart.subtotal(), badge.count)),
        badge,
    }
}

/// Reload the cart from `store`, render it, and publish the change.
pub async fn render_cart<S: KeyValueStore>(store: &CartStore<S>, events: &CartEvents) -> CartView {
    let cart = store.load().await;
    let view = render(&cart);
    events.publish(CartChanged::new(&cart, &view));
    view
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use sleep_outside_core::{ProductId, Quantity};

    use super::*;
    use crate::cart::item::NewLineItem;
    use crate::cart::ops;
    use crate::cart::store::MemoryStore;

    fn product(id: &str, price: Decimal) -> NewLineItem {
        NewLineItem {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            brand: "Brand".to_string(),
            unit_price: price,
            image_url: None,
            color_name: None,
        }
    }

    fn dollars(num: i64, scale: u32) -> Decimal {
        Decimal::new(num, scale)
    }

    #[test]
    fn test_contract_constants() {
        assert_eq!(TAX_RATE, dollars(6, 2));
        assert_eq!(FREE_SHIPPING_THRESHOLD, dollars(100, 0));
        assert_eq!(FLAT_SHIPPING, dollars(999, 2));
    }

    #[test]
    fn test_empty_cart_has_no_summary() {
        let view = render(&Cart::default());
        assert!(view.is_empty());
        assert!(view.summary.is_none());
        assert!(!view.badge.visible());
        assert_eq!(view.badge.count, 0);
    }

    #[test]
    fn test_merge_example_subtotal_at_threshold_pays_shipping() {
        let mut cart = Cart::default();
        cart.add(product("A", dollars(50, 0)), Utc::now());
        cart.add(product("A", dollars(50, 0)), Utc::now());

        let view = render(&cart);
        let line = view.lines.first().unwrap();
        let summary = view.summary.unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(line.extended_price.amount, dollars(100, 0));
        assert_eq!(summary.subtotal.amount, dollars(100, 0));
        assert_eq!(summary.tax.amount, dollars(600, 2));
        assert_eq!(summary.shipping.amount, dollars(999, 2));
        assert!(!summary.free_shipping());
        assert_eq!(summary.total.amount, dollars(11_599, 2));
        assert_eq!(summary.total.display(), "$115.99");
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let summary = CartSummary::from_subtotal(dollars(150, 0), 3);
        assert_eq!(summary.shipping.amount, Decimal::ZERO);
        assert!(summary.free_shipping());
        assert_eq!(summary.tax.amount, dollars(900, 2));
        assert_eq!(summary.total.amount, dollars(15_900, 2));
    }

    #[test]
    fn test_just_above_threshold_ships_free() {
        let summary = CartSummary::from_subtotal(dollars(10_001, 2), 1);
        assert!(summary.free_shipping());
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 19.99 * 0.06 = 1.1994
        let summary = CartSummary::from_subtotal(dollars(1_999, 2), 1);
        assert_eq!(summary.tax.amount, dollars(120, 2));
        assert_eq!(summary.total.amount, dollars(3_118, 2));
    }

    #[test]
    fn test_lines_follow_cart_order_with_indices() {
        let mut cart = Cart::default();
        cart.add(product("A", dollars(10, 0)), Utc::now());
        cart.add(product("B", dollars(20, 0)), Utc::now());
        cart.set_quantity(1, 10, Utc::now());

        let view = render(&cart);

        let summary: Vec<(usize, &str)> = view
            .lines
            .iter()
            .map(|line| (line.index, line.id.as_str()))
            .collect();
        assert_eq!(summary, [(0, "A"), (1, "B")]);
        assert_eq!(view.badge.count, 11);

        let a = view.lines.first().unwrap();
        assert!(!a.can_decrease);
        assert!(a.can_increase);
        let b = view.lines.get(1).unwrap();
        assert!(b.can_decrease);
        assert!(!b.can_increase);
        assert_eq!(b.quantity, Quantity::MAX.get());
    }

    #[tokio::test]
    async fn test_render_cart_is_idempotent() {
        let store = CartStore::new(MemoryStore::new());
        let events = CartEvents::new();
        ops::add_item(&store, product("A", dollars(3_550, 2)), Utc::now())
            .await
            .unwrap();

        let first = render_cart(&store, &events).await;
        let second = render_cart(&store, &events).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_render_after_remove_drops_line() {
        let store = CartStore::new(MemoryStore::new());
        let events = CartEvents::new();
        for id in ["A", "B", "C"] {
            ops::add_item(&store, product(id, dollars(10, 0)), Utc::now())
                .await
                .unwrap();
        }

        ops::remove_item(&store, 0).await.unwrap();
        let view = render_cart(&store, &events).await;

        let ids: Vec<(usize, &str)> = view
            .lines
            .iter()
            .map(|line| (line.index, line.id.as_str()))
            .collect();
        assert_eq!(ids, [(0, "B"), (1, "C")]);
    }

    #[tokio::test]
    async fn test_render_cart_publishes_change() {
        let store = CartStore::new(MemoryStore::new());
        let events = CartEvents::new();
        let mut rx = events.subscribe();
        ops::add_item(&store, product("A", dollars(150, 0)), Utc::now())
            .await
            .unwrap();

        render_cart(&store, &events).await;
        let event = rx.recv().await.unwrap();

        assert_eq!(event.total_items, 1);
        assert_eq!(event.total, dollars(15_900, 2));
        assert_eq!(event.items.len(), 1);
    }
}
