//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product listing
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns "+1" marker, badge, toast)
//! POST /cart/update            - Set quantity (returns cart panel)
//! POST /cart/adjust            - +/- buttons (returns cart panel with marker)
//! POST /cart/remove            - Remove item (returns cart panel, undo banner)
//! POST /cart/undo              - Undo last removal (returns cart panel)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Confirmation prompt
//! POST /checkout               - Place order, clear cart
//!
//! # Assets
//! GET  /static/*               - CSS and scripts
//! GET  /images/*               - Product images
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::middleware::create_session_layer;
use crate::state::AppState;

const STATIC_DIR: &str = "crates/storefront/static";

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/adjust", post(cart::adjust))
        .route("/remove", post(cart::remove))
        .route("/undo", post(cart::undo))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::confirm))
}

/// Build the full application: routes, assets, sessions, and request tracing.
///
/// The session store decides where carts persist.
pub fn app<S: SessionStore + Clone>(state: AppState, session_store: S) -> Router {
    let session_layer = create_session_layer(session_store, state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/images", ServeDir::new(format!("{STATIC_DIR}/images")))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}
