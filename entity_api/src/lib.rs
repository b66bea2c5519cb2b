//! Store operations over the `entity` models.
//!
//! This crate is the persistence boundary: higher layers (`domain`, `web`)
//! talk to user records exclusively through the functions exposed here and
//! never construct sea-orm queries themselves.

pub mod error;
pub mod user;

// Re-exports from the `entity` crate so consumers depend on one crate only.
pub use entity::{provider, token_pair, users, Id};
