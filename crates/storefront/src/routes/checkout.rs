//! Checkout confirmation.
//!
//! There is no payment step: confirming clears the cart and thanks the
//! visitor. An empty cart never reaches the confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::cart::{CartBadge, CartView, ops, render_cart};
use crate::error::{Result, add_breadcrumb};
use crate::feedback::EMPTY_CHECKOUT_MESSAGE;
use crate::filters;
use crate::middleware::VisitorCart;
use crate::routes::cart::with_cart_trigger;
use crate::state::AppState;

/// Confirmation prompt, or the empty-cart notice.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirm.html")]
pub struct CheckoutConfirmTemplate {
    pub badge: CartBadge,
    pub view: CartView,
    pub empty_message: &'static str,
}

/// Order placed page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub badge: CartBadge,
}

fn confirm_page(view: CartView) -> CheckoutConfirmTemplate {
    CheckoutConfirmTemplate {
        badge: view.badge,
        view,
        empty_message: EMPTY_CHECKOUT_MESSAGE,
    }
}

/// Ask the visitor to confirm the order.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, VisitorCart(cart): VisitorCart) -> impl IntoResponse {
    confirm_page(render_cart(&cart, state.cart_events()).await)
}

/// Place the order: clear the cart.
///
/// With an empty cart nothing changes and the notice is shown again.
#[instrument(skip(state, cart))]
pub async fn confirm(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
) -> Result<Response> {
    let before = cart.load().await;
    if before.is_empty() {
        tracing::debug!("Checkout attempted with empty cart");
        return Ok(confirm_page(render_cart(&cart, state.cart_events()).await).into_response());
    }

    let total_items = before.total_items().to_string();
    ops::clear_cart(&cart).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("total_items", total_items.as_str())]),
    );

    let view = render_cart(&cart, state.cart_events()).await;
    Ok(with_cart_trigger(
        view.hx_trigger(),
        CheckoutCompleteTemplate { badge: view.badge },
    ))
}
