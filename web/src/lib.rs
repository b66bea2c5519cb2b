//! HTTP transport for the authentication gateway.
//!
//! Controllers are thin adapters over `domain::auth::AuthGateway`: they parse
//! transport input, call one gateway operation, and render the result
//! (including the cookie decisions the domain made) back onto the response.

use std::sync::Arc;

use domain::auth::AuthGateway;
use domain::error::Error as DomainError;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub(crate) mod controller;
pub mod error;
pub(crate) mod extractors;
pub mod middleware;
pub(crate) mod params;
pub(crate) mod response;
pub mod router;

pub use error::{Error, Result};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    db: Arc<DatabaseConnection>,
    pub auth: Arc<AuthGateway>,
}

impl AppState {
    /// Build the state once at startup. Fails when an enabled strategy is
    /// missing credentials.
    pub fn new(config: Config, db: &Arc<DatabaseConnection>) -> std::result::Result<Self, DomainError> {
        let auth = Arc::new(AuthGateway::new(&config)?);
        Ok(Self {
            config,
            // Arc is cloned, but the source DatabaseConnection refers to the same instance
            // as the one passed in to new() (see the Arc documentation for more info)
            db: Arc::clone(db),
            auth,
        })
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}
