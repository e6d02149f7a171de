//! Core business logic - framework-agnostic ledger, storefront and probe operations.
//!
//! Nothing in here knows about Discord. Every operation returns structured data or a
//! typed [`crate::errors::Error`]; rendering is left to the bot layer.

/// Apartment capacity ledger
pub mod apartment;
/// Game server reachability probe
pub mod server;
/// Flat-file persistence for the ledger
pub mod store;
/// Tebex plugin API client
pub mod tebex;
