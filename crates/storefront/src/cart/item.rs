//! Cart line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sleep_outside_core::{ProductId, Quantity};

use crate::catalog::Product;

/// Image shown when a line item has none.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.svg";

/// Name shown when a line item has none.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// One product entry in the cart, in its canonical persisted shape.
///
/// Reads from storage go through [`super::legacy`] so that older shapes are
/// normalized into this one; writes always use this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product ID, the merge key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Brand name (may be empty).
    #[serde(default)]
    pub brand: String,
    /// Price of a single unit.
    pub unit_price: Decimal,
    /// Units in the cart.
    pub quantity: Quantity,
    /// Product image URL.
    pub image_url: String,
    /// Selected color, if the product has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,
    /// When the product was first added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    /// When the quantity last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn extended_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// Product data posted by an "add to cart" control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub unit_price: Decimal,
    pub image_url: Option<String>,
    pub color_name: Option<String>,
}

impl NewLineItem {
    /// Build the first line item for this product (quantity 1).
    #[must_use]
    pub fn into_line_item(self, now: DateTime<Utc>) -> CartLineItem {
        CartLineItem {
            id: self.id,
            name: if self.name.trim().is_empty() {
                UNKNOWN_PRODUCT_NAME.to_owned()
            } else {
                self.name
            },
            brand: self.brand,
            unit_price: self.unit_price.max(Decimal::ZERO),
            quantity: Quantity::MIN,
            image_url: self
                .image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            color_name: self.color_name,
            added_at: Some(now),
            updated_at: None,
        }
    }
}

impl From<&Product> for NewLineItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            unit_price: product.price,
            image_url: product.image.clone(),
            color_name: product.color_name.clone(),
        }
    }
}
