pub mod config;
pub mod consultation; // intake form state machine
pub mod directory; // patient directory cache
pub mod intake; // submission orchestrator
pub mod models;
pub mod service; // persistence collaborator surface

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding application.
///
/// Respects `RUST_LOG` when set, otherwise falls back to the crate default
/// filter. Safe to call when the host already installed a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} intake core v{}", config::APP_NAME, config::APP_VERSION);
}
