pub mod bookmarks;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod observability;
pub mod schema;
pub mod server;
pub mod services;

#[cfg(test)]
pub mod tests;

pub use config::*;
pub use error::*;
pub use server::*;

use anyhow::Result;
use std::panic;

/// Main server entry point for library usage
pub async fn run_server() -> Result<()> {
    let app_config = config::load_config()?;
    run_with_config(app_config).await
}

/// Run the server with an already loaded configuration
pub async fn run_with_config(app_config: AppConfig) -> Result<()> {
    // A subscriber may already be installed when embedded (tests, other binaries)
    if let Err(e) = logging::setup_tracing(&app_config.logging) {
        eprintln!("Logging not initialized: {}", e);
    }

    panic::set_hook(Box::new(|panic_info| {
        ::tracing::error!(?panic_info, "FATAL: Panic occurred");
    }));

    observability::init_metrics()?;

    ::tracing::info!(
        environment = app_config.environment.as_str(),
        "Bookmarks API starting up"
    );

    server::start_server(app_config).await
}
