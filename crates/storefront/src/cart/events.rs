//! Cart-changed notifications.
//!
//! Every render publishes a [`CartChanged`] on an in-process broadcast
//! channel, and the HTTP layer forwards the same event to the browser in an
//! `HX-Trigger` header so client-side observers (badge pulse, animations) can
//! react without polling.

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;

use super::item::CartLineItem;
use super::model::Cart;
use super::render::CartView;

/// Name of the client-side event.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

const CHANNEL_CAPACITY: usize = 64;

/// State of the cart right after a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChanged {
    pub items: Vec<CartLineItem>,
    pub total_items: u32,
    /// Grand total including tax and shipping; zero for an empty cart.
    pub total: Decimal,
}

impl CartChanged {
    /// Capture a cart and its rendered view.
    #[must_use]
    pub fn new(cart: &Cart, view: &CartView) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_items: view.badge.count,
            total: view
                .summary
                .map_or(Decimal::ZERO, |summary| summary.total.amount),
        }
    }
}

impl CartView {
    /// Value for an `HX-Trigger` response header announcing this state.
    ///
    /// Carries the counts only; the line items stay server-side.
    #[must_use]
    pub fn hx_trigger(&self) -> String {
        let total = self
            .summary
            .map_or(Decimal::ZERO, |summary| summary.total.amount);
        serde_json::json!({
            CART_UPDATED_EVENT: {
                "totalItems": self.badge.count,
                "total": total.round_dp(2).to_string(),
            }
        })
        .to_string()
    }
}

/// Broadcast channel for [`CartChanged`].
///
/// Publishing never blocks; with no subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartChanged>,
}

impl CartEvents {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartChanged> {
        self.sender.subscribe()
    }

    /// Publish an event.
    pub fn publish(&self, event: CartChanged) {
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}
