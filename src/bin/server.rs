use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

use token_gate::auth::{AuthService, SystemClock};
use token_gate::config::ServerConfig;
use token_gate::routes;
use token_gate::security::ProductionChecker;
use token_gate::storage::open_user_storage;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Load config from file and environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, token_ttl={}s",
        config.host,
        config.port,
        config.token_validity.as_secs()
    );

    let checker = ProductionChecker::from_env();
    info!("Environment: {}", checker.environment());
    checker.log_warnings(&config);

    // Connect to the user store and migrate it
    let users = match open_user_storage(&config.database_url) {
        Ok(users) => users,
        Err(e) => {
            error!("Failed to open user store: {}", e);
            std::process::exit(1);
        }
    };

    let service = match AuthService::from_config(&config, users, Arc::new(SystemClock)) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to initialize auth service: {}", e);
            std::process::exit(1);
        }
    };

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let routes = routes(service);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    match (&config.tls_cert_path, &config.tls_key_path) {
        (Some(cert_path), Some(key_path)) if config.enable_tls => {
            info!("Starting Token Gate server on https://{}", addr);
            let (_, server) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(addr, shutdown);
            server.await;
        }
        _ => {
            info!("Starting Token Gate server on http://{}", addr);
            let (_, server) = match warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown) {
                Ok(bound) => bound,
                Err(e) => {
                    error!("Failed to bind {}: {}", addr, e);
                    std::process::exit(1);
                }
            };
            server.await;
        }
    }

    info!("Server stopped");
}
