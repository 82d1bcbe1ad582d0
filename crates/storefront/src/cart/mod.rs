//! Cart state: storage, line items, mutations, and rendering.
//!
//! # Flow
//!
//! ```text
//! request -> ops (load, mutate, save) -> render_cart (reload, view model)
//!                                           |
//!                                           +-> CartEvents / HX-Trigger
//! ```
//!
//! The store is the only source of truth. Nothing here caches a cart between
//! calls; every operation receives the [`CartStore`] it works on.

pub mod events;
pub mod item;
pub mod legacy;
pub mod model;
pub mod ops;
pub mod render;
pub mod session_storage;
pub mod store;
pub mod undo;

pub use events::{CART_UPDATED_EVENT, CartChanged, CartEvents};
pub use item::{CartLineItem, NewLineItem, PLACEHOLDER_IMAGE};
pub use model::{AddOutcome, Cart};
pub use ops::{Mutation, Removal};
pub use render::{
    CartBadge, CartSummary, CartView, FLAT_SHIPPING, FREE_SHIPPING_THRESHOLD, LineView, TAX_RATE,
    render, render_cart,
};
pub use session_storage::SessionStorage;
pub use store::{CART_KEY, CartStore, KeyValueStore, LEGACY_CART_KEY, MemoryStore, StoreError};
pub use undo::{UndoEntry, UndoOutcome};
