//! Business core of the authentication gateway.
//!
//! The `domain` crate owns everything between the HTTP transport (`web`) and
//! the user store (`entity_api`): provider adapters, the single-use
//! intermediary auth-code store, JWT session issuance, and the gateway that
//! orchestrates a signin end to end. Consumers of this crate never touch
//! `entity_api` directly; the relevant items are re-exported here so layer
//! boundaries stay intact.

// Re-exports from the `entity` crate via `entity_api`
pub use entity_api::{provider, token_pair, users, Id};

pub mod auth;
pub mod auth_code;
pub mod error;
pub mod session;
pub mod strategy;
pub mod user;

pub mod gateway;
