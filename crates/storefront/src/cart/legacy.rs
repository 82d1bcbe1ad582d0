//! Decoding of persisted carts, including older line-item shapes.
//!
//! Two writers have historically stored carts with different field names:
//!
//! - the cart page stored full catalog records (`Id`, `Name`, `FinalPrice`,
//!   `Brand.Name`, `Images.PrimaryMedium`, `Colors[0].ColorName`, ...)
//! - the product listing stored a short record (`id`, `name`, `price`,
//!   `image`, `quantity`, `addedAt`)
//!
//! Both, and the canonical [`CartLineItem`] shape, decode through
//! [`StoredLineItem`]. For every field the richer or canonical name wins, the
//! alternate name is the fallback, and a safe default fills the gap.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use sleep_outside_core::{ProductId, Quantity};

use super::item::{CartLineItem, PLACEHOLDER_IMAGE, UNKNOWN_PRODUCT_NAME};
use super::model::Cart;

/// Errors decoding a persisted cart as a whole.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stored text is not JSON.
    #[error("stored cart is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The stored JSON is not an array.
    #[error("stored cart is not an array")]
    NotAnArray,
}

/// A persisted line item in any of the known shapes.
///
/// Every field is optional and untyped so that a single bad value only costs
/// that field, not the item.
#[derive(Debug, Default, Deserialize)]
struct StoredLineItem {
    #[serde(rename = "Id")]
    id_upper: Option<Value>,
    id: Option<Value>,
    #[serde(rename = "Name")]
    name_upper: Option<Value>,
    name: Option<Value>,
    #[serde(rename = "Brand")]
    brand_upper: Option<Value>,
    brand: Option<Value>,
    #[serde(rename = "unitPrice")]
    unit_price: Option<Value>,
    #[serde(rename = "FinalPrice")]
    final_price: Option<Value>,
    price: Option<Value>,
    quantity: Option<Value>,
    #[serde(rename = "imageUrl")]
    image_url: Option<Value>,
    #[serde(rename = "Images")]
    images: Option<Value>,
    #[serde(rename = "Image")]
    image_upper: Option<Value>,
    image: Option<Value>,
    #[serde(rename = "colorName")]
    color_name: Option<Value>,
    #[serde(rename = "Colors")]
    colors: Option<Value>,
    #[serde(rename = "addedAt")]
    added_at: Option<Value>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<Value>,
}

impl StoredLineItem {
    /// Normalize into the canonical shape.
    ///
    /// Returns `None` when no usable product ID is present.
    fn normalize(self) -> Option<CartLineItem> {
        let id = first_text([self.id_upper.as_ref(), self.id.as_ref()])
            .and_then(|id| ProductId::parse(&id).ok())?;

        let name = first_text([self.name_upper.as_ref(), self.name.as_ref()])
            .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_owned());

        let brand = first_text([
            self.brand_upper
                .as_ref()
                .map(|brand| brand.get("Name").unwrap_or(brand)),
            self.brand.as_ref(),
        ])
        .unwrap_or_default();

        let unit_price = [
            self.unit_price.as_ref(),
            self.final_price.as_ref(),
            self.price.as_ref(),
        ]
        .into_iter()
        .find_map(|value| value.and_then(parse_price))
        .unwrap_or(Decimal::ZERO);

        let quantity = self
            .quantity
            .as_ref()
            .and_then(parse_quantity)
            .unwrap_or(Quantity::MIN);

        let image_url = first_text([
            self.image_url.as_ref(),
            self.images.as_ref().and_then(|images| images.get("PrimaryMedium")),
            self.image_upper.as_ref(),
            self.image.as_ref(),
        ])
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned());

        let color_name = first_text([
            self.color_name.as_ref(),
            self.colors
                .as_ref()
                .and_then(|colors| colors.get(0))
                .and_then(|color| color.get("ColorName")),
        ]);

        Some(CartLineItem {
            id,
            name,
            brand,
            unit_price,
            quantity,
            image_url,
            color_name,
            added_at: self.added_at.as_ref().and_then(parse_timestamp),
            updated_at: self.updated_at.as_ref().and_then(parse_timestamp),
        })
    }
}

/// Decode a stored cart.
///
/// Items that are not objects or lack an ID are skipped; duplicate IDs are
/// merged into the first occurrence.
///
/// # Errors
///
/// Returns [`DecodeError`] when the text is not JSON or not a JSON array.
pub fn decode_cart(text: &str) -> Result<Cart, DecodeError> {
    let Value::Array(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(DecodeError::NotAnArray);
    };

    let mut cart = Cart::default();
    for (position, entry) in entries.into_iter().enumerate() {
        let item = serde_json::from_value::<StoredLineItem>(entry)
            .ok()
            .and_then(StoredLineItem::normalize);
        match item {
            Some(item) => cart.absorb(item),
            None => tracing::warn!(position, "Skipping unreadable cart entry"),
        }
    }
    Ok(cart)
}

/// First candidate that is a non-empty string or a number, as text.
fn first_text<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<String> {
    candidates.into_iter().flatten().find_map(|value| match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// A non-negative decimal from a JSON number or numeric string.
fn parse_price(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }?;
    (!parsed.is_sign_negative()).then_some(parsed)
}

fn parse_quantity(value: &Value) -> Option<Quantity> {
    let whole = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    Some(Quantity::clamped(whole))
}

#[allow(clippy::cast_possible_truncation)] // saturating cast, clamped by the caller
fn truncate(value: f64) -> i64 {
    value as i64
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
