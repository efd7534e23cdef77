//! Medical-note HTTP server binary.

use std::sync::Arc;

use prontuario_compiler::{HttpRegistry, MedicationRegistry};
use prontuario_service::{serve, AppState, ServiceConfig, SharedDirectory};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// The blocking registry client must not be created inside the server runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServiceConfig::from_env();
    let directory = SharedDirectory::default();

    let registry: Arc<dyn MedicationRegistry> = match &config.registry {
        Some(registry_config) => {
            let registry = HttpRegistry::new(registry_config.clone())?;
            tracing::info!(
                "Resolving medications against {} (timeout {}s)",
                registry.base_url(),
                registry_config.timeout_secs()
            );
            Arc::new(registry)
        }
        None => {
            tracing::info!("Resolving medications against the local directory");
            Arc::new(directory.clone())
        }
    };

    let state = AppState::new(directory, registry);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(&config, state))?;

    Ok(())
}
