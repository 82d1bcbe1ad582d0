//! Core types for Sleep Outside.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, Price, round_cents};
pub use quantity::Quantity;
