use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelsmith_bootstrap::config::BootstrapConfig;
use reelsmith_bootstrap::launch;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsmith_bootstrap=info,reelsmith_db=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match BootstrapConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid bootstrap configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        target_db = %config.target(),
        skip_migrations = config.skip_migrations,
        "Loaded bootstrap configuration"
    );

    // --- Database ---
    if let Err(e) = launch::prepare_database(&config).await {
        tracing::error!(error = %e, "Database initialization failed");
        std::process::exit(1);
    }

    // --- Server ---
    let err = launch::exec_server(&config.server_command);
    tracing::error!(error = %err, "Could not start the server");
    std::process::exit(1);
}
