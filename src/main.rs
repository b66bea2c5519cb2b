use log::*;
use std::sync::Arc;

use service::config::Config;
use service::logging::Logger;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting auth gateway in the {} environment",
        config.runtime_env()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to connect to the database: {e}");
            std::process::exit(1);
        }
    };

    // Strategy activation happens here: an enabled strategy with missing
    // credentials stops the process instead of failing on the first signin.
    let app_state = match AppState::new(config.clone(), &db) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Invalid authentication strategy configuration: {e}");
            std::process::exit(1);
        }
    };

    let router = web::router::define_routes(app_state);

    let interface = config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let address = format!("{}:{}", interface, config.port);
    info!("Listening on {address}");

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind the listen address");
    axum::serve(listener, router)
        .await
        .expect("Server exited with an error");
}
