//! Sleep Outside storefront library.
//!
//! Product listing, a session-backed shopping cart, and checkout
//! confirmation, served as HTMX-enhanced HTML. The crate is a library so the
//! router can be driven from integration tests; `main.rs` only wires
//! configuration, telemetry, and the session store around [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feedback;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
