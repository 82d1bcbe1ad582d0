//! Cart extractor.
//!
//! Gives handlers the visitor's cart store without touching the session
//! directly.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::cart::{CartStore, SessionStorage};
use crate::error::AppError;

/// The requesting visitor's cart, backed by their session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(VisitorCart(cart): VisitorCart) -> impl IntoResponse {
///     let items = cart.load().await.total_items();
///     format!("{items} items")
/// }
/// ```
pub struct VisitorCart(pub CartStore<SessionStorage>);

impl<S> FromRequestParts<S> for VisitorCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        Ok(Self(CartStore::new(SessionStorage::new(session))))
    }
}
