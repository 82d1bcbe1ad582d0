//! The cart: an ordered sequence of line items.
//!
//! Positions are meaningful. Rendered controls refer to items by index, so an
//! index is only valid against the cart it was rendered from; a removal shifts
//! every later item down by one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use sleep_outside_core::{ProductId, Quantity};

use super::item::{CartLineItem, NewLineItem};

/// Ordered cart contents, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

/// Result of adding a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product was new and appended at `index`.
    Added { index: usize },
    /// The product was already at `index`; its quantity is now `quantity`.
    Merged { index: usize, quantity: Quantity },
}

impl AddOutcome {
    /// Position of the affected line.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Added { index } | Self::Merged { index, .. } => *index,
        }
    }
}

impl Cart {
    /// Create a cart from items, merging duplicate IDs.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            cart.absorb(item);
        }
        cart
    }

    /// Items in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CartLineItem> {
        self.items.get(index)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of a product.
    #[must_use]
    pub fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Total units across all lines (the header badge count).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| u32::from(item.quantity)).sum()
    }

    /// Sum of extended prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLineItem::extended_price).sum()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart gets one more unit (up to the maximum);
    /// otherwise it is appended with quantity 1.
    pub fn add(&mut self, product: NewLineItem, now: DateTime<Utc>) -> AddOutcome {
        if let Some(index) = self.position(&product.id)
            && let Some(existing) = self.items.get_mut(index)
        {
            existing.quantity = existing.quantity.increment();
            existing.updated_at = Some(now);
            return AddOutcome::Merged {
                index,
                quantity: existing.quantity,
            };
        }

        self.items.push(product.into_line_item(now));
        AddOutcome::Added {
            index: self.items.len() - 1,
        }
    }

    /// Set the quantity of the line at `index`, clamped to the valid range.
    ///
    /// Returns `None` (and changes nothing) if `index` is out of range.
    pub fn set_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Option<Quantity> {
        let item = self.items.get_mut(index)?;
        item.quantity = Quantity::clamped(quantity);
        item.updated_at = Some(now);
        Some(item.quantity)
    }

    /// Change the quantity of the line at `index` by `delta`, clamped.
    ///
    /// Returns `None` (and changes nothing) if `index` is out of range. A line
    /// already at the limit keeps its quantity and its `updated_at`.
    pub fn change_quantity_by(
        &mut self,
        index: usize,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Option<Quantity> {
        let item = self.items.get_mut(index)?;
        let quantity = item.quantity.offset(delta);
        if quantity != item.quantity {
            item.quantity = quantity;
            item.updated_at = Some(now);
        }
        Some(quantity)
    }

    /// Remove the line at `index`; later lines move up by one.
    pub fn remove(&mut self, index: usize) -> Option<CartLineItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Put a previously removed line back.
    ///
    /// If the product has been re-added in the meantime the units are merged
    /// into that line instead. Returns the line's position.
    pub fn restore(&mut self, item: CartLineItem, index: usize) -> usize {
        if let Some(position) = self.position(&item.id)
            && let Some(existing) = self.items.get_mut(position)
        {
            existing.quantity = existing.quantity.offset(i64::from(item.quantity.get()));
            return position;
        }

        let index = index.min(self.items.len());
        self.items.insert(index, item);
        index
    }

    /// Append an item, merging units into an existing line with the same ID.
    pub(crate) fn absorb(&mut self, item: CartLineItem) {
        let len = self.items.len();
        self.restore(item, len);
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
