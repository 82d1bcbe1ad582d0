//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Session layer (tower-sessions; memory or `PostgreSQL` store)
//! 3. `TraceLayer` (request tracing)

pub mod cart;
pub mod session;

pub use cart::VisitorCart;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
