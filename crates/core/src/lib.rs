//! Sleep Outside Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront and its tests:
//! product identifiers, clamped cart quantities, and decimal prices.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP.
//! Anything that touches the visitor's session or renders HTML lives in the
//! `storefront` crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, quantities, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
