//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::cart::{CartBadge, PLACEHOLDER_IMAGE, render};
use crate::catalog::Product;
use crate::error::Result;
use crate::filters;
use crate::middleware::VisitorCart;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub brand: String,
    /// Formatted, e.g. "$199.99".
    pub price: String,
    /// Plain decimal for the `data-price` attribute.
    pub price_value: String,
    pub image_url: String,
    pub color_name: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.display_price().display(),
            price_value: product.price.round_dp(2).to_string(),
            image_url: product
                .image
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            color_name: product.color_name.clone(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub badge: CartBadge,
    pub products: Vec<ProductView>,
}

/// Display product listing page.
///
/// Creates the visitor's (empty) cart on first visit.
#[instrument(skip(state, cart))]
pub async fn index(
    State(state): State<AppState>,
    VisitorCart(cart): VisitorCart,
) -> Result<impl IntoResponse> {
    cart.initialize().await?;
    let badge = render(&cart.load().await).badge;

    Ok(ProductsIndexTemplate {
        badge,
        products: state.catalog().products().iter().map(ProductView::from).collect(),
    })
}
