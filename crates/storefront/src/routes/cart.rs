//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Each mutation answers with the re-rendered cart panel (or, for adds, a
//! "+1" marker), the header badge as an out-of-band swap, and any feedback
//! toast. The `HX-Trigger` header carries the cart-updated event.
//!
//! Form fields arrive as strings so that malformed indices and quantities are
//! ignored instead of rejected.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use sleep_outside_core::ProductId;

use crate::cart::ops::{self, Mutation};
use crate::cart::undo::{self, UndoOutcome};
use crate::cart::{CartBadge, CartStore, CartView, NewLineItem, SessionStorage, render, render_cart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::feedback::{Direction, Marker, NOTHING_TO_UNDO_MESSAGE, Toast, UNDO_EXPIRED_MESSAGE};
use crate::filters;
use crate::middleware::VisitorCart;
use crate::state::AppState;

/// A marker attached to one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    pub index: usize,
    pub marker: Marker,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default)]
    pub id: String,
}

/// Set quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub quantity: String,
}

/// Quantity button form data.
#[derive(Debug, Deserialize)]
pub struct AdjustCartForm {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub direction: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    #[serde(default)]
    pub index: String,
}

/// Undo form data.
#[derive(Debug, Deserialize)]
pub struct UndoForm {
    #[serde(default)]
    pub token: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub badge: CartBadge,
    pub view: CartView,
    pub marker: Option<LineMarker>,
}

/// Cart panel with out-of-band badge and toast (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel_response.html")]
pub struct CartPanelTemplate {
    pub badge: CartBadge,
    pub view: CartView,
    pub marker: Option<LineMarker>,
    pub toast: Option<Toast>,
}

/// "+1" marker with out-of-band badge and toast (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/add_response.html")]
pub struct AddResponseTemplate {
    pub marker: Marker,
    pub badge: CartBadge,
    pub toast: Toast,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub badge: CartBadge,
}

/// Attach the cart-updated event to a response.
pub(crate) fn with_cart_trigger(trigger: String, body: impl IntoResponse) -> Response {
    (AppendHeaders([("HX-Trigger", trigger)]), body).into_response()
}

/// Re-render the cart panel after a mutation.
async fn panel_response(
    state: &AppState,
    cart: &CartStore<SessionStorage>,
    marker: Option<LineMarker>,
    toast: Option<Toast>,
) -> Response {
    let view = render_cart(cart, state.cart_events()).await;
    let trigger = view.hx_trigger();
    with_cart_trigger(
        trigger,
        CartPanelTemplate {
            badge: view.badge,
            view,
            marker,
            toast,
        },
    )
}

/// Display cart page.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, VisitorCart(cart): VisitorCart) -> impl IntoResponse {
    let view = render_cart(&cart, state.cart_events()).await;
    CartShowTemplate {
        badge: view.badge,
        view,
        marker: None,
    }
}

/// Add one unit of a catalog product (HTMX).
///
/// The posted ID is resolved against the catalog; name, price and image come
/// from there, never from the form.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let product = state
        .catalog()
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let outcome = ops::add_item(&cart, NewLineItem::from(product), Utc::now()).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
    tracing::debug!(?outcome, "Add to cart handled");

    let view = render_cart(&cart, state.cart_events()).await;
    Ok(with_cart_trigger(
        view.hx_trigger(),
        AddResponseTemplate {
            marker: Marker::added(),
            badge: view.badge,
            toast: Toast::added(&product.name),
        },
    ))
}

/// Set the quantity of a line from the quantity input (HTMX).
#[instrument(skip(state, cart))]
pub async fn update(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    match (ops::parse_index(&form.index), ops::parse_quantity(&form.quantity)) {
        (Some(index), Some(quantity)) => {
            ops::set_quantity(&cart, index, quantity, Utc::now()).await?;
        }
        _ => tracing::debug!("Ignoring malformed quantity update"),
    }

    Ok(panel_response(&state, &cart, None, None).await)
}

/// Step a line's quantity up or down from the +/- buttons (HTMX).
#[instrument(skip(state, cart))]
pub async fn adjust(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
    Form(form): Form<AdjustCartForm>,
) -> Result<Response> {
    let marker = match (ops::parse_index(&form.index), Direction::parse(&form.direction)) {
        (Some(index), Some(direction)) => {
            match ops::change_quantity_by(&cart, index, direction.delta(), Utc::now()).await? {
                Mutation::Updated { index, .. } => Some(LineMarker {
                    index,
                    marker: Marker { direction },
                }),
                Mutation::Unchanged { .. } | Mutation::Ignored => None,
            }
        }
        _ => {
            tracing::debug!("Ignoring malformed quantity adjustment");
            None
        }
    };

    Ok(panel_response(&state, &cart, marker, None).await)
}

/// Remove a line and offer to undo it (HTMX).
#[instrument(skip(state, cart))]
pub async fn remove(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let removal = match ops::parse_index(&form.index) {
        Some(index) => ops::remove_item(&cart, index).await?,
        None => None,
    };

    let toast = match removal {
        Some(removal) => {
            let name = removal.item.name.clone();
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", removal.item.id.as_str())]),
            );
            let entry = undo::remember_removal(&cart, removal, Utc::now()).await?;
            Some(Toast::removed(&name, entry.token))
        }
        None => None,
    };

    Ok(panel_response(&state, &cart, None, toast).await)
}

/// Put back the most recently removed line (HTMX).
#[instrument(skip(state, cart))]
pub async fn undo(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
    Form(form): Form<UndoForm>,
) -> Result<Response> {
    let outcome = match Uuid::parse_str(form.token.trim()) {
        Ok(token) => undo::undo_removal(&cart, token, Utc::now()).await?,
        Err(_) => UndoOutcome::NotFound,
    };

    let toast = match outcome {
        UndoOutcome::Restored { item, .. } => {
            add_breadcrumb(
                "cart",
                "Undid removal",
                Some(&[("product_id", item.id.as_str())]),
            );
            Toast::restored(&item.name)
        }
        UndoOutcome::Expired => Toast::notice(UNDO_EXPIRED_MESSAGE),
        UndoOutcome::NotFound => Toast::notice(NOTHING_TO_UNDO_MESSAGE),
    };

    Ok(panel_response(&state, &cart, None, Some(toast)).await)
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(VisitorCart(cart): VisitorCart) -> impl IntoResponse {
    CartCountTemplate {
        badge: render(&cart.load().await).badge,
    }
}
