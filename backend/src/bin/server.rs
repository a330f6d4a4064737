//! Ercole API HTTP Server Binary
//!
//! Loads the configuration, builds the in-memory service and serves the
//! REST API.
//!
//! # Usage
//!
//! ```bash
//! ERCOLE_CONFIG=/etc/ercole/ercole.toml cargo run --bin ercole-api-server
//! ```
//!
//! # Environment Variables
//!
//! - `ERCOLE_CONFIG`: configuration file (default: `./ercole.toml`, `./config/ercole.toml`)
//! - `HOST`, `PORT`: bind address overrides
//! - `ERCOLE_READ_ONLY`: reject every mutating request
//! - `ERCOLE_AUTH_SECRET`: token signing secret
//! - `RUST_LOG`: log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ercole_api::auth::BasicAuthProvider;
use ercole_api::config::Configuration;
use ercole_api::http::{create_router, AppState};
use ercole_api::service::{system_clock, ApiService, LocalService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Ercole API server");

    let config = Configuration::load()?;
    if config.api_service.read_only {
        warn!("Read-only mode: every mutating request will be rejected");
    }

    let auth_config = config.api_service.authentication_provider.clone();
    let service: Arc<dyn ApiService> = Arc::new(LocalService::new().with_super_user(&auth_config.password));
    let authenticator = BasicAuthProvider::new(auth_config, service.clone(), system_clock());
    info!("Service initialized successfully");

    let addr: SocketAddr = format!("{}:{}", config.api_service.bind_host, config.api_service.port).parse()?;
    let state = AppState::new(config, service, Arc::new(authenticator));
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Liveness check: http://{}/ping", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
