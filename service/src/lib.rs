pub mod config;
pub mod logging;

use config::Config;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Connects to the database described by `config` with the configured pool
/// bounds and timeouts.
pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut connect_options = ConnectOptions::new(config.database_url().to_owned());
    connect_options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs));

    Database::connect(connect_options).await
}
