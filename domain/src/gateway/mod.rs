//! Clients for the external identity providers this gateway can delegate to.

pub mod oauth;
