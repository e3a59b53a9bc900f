#![doc = include_str!("../README.md")]

use clap::Parser;
use eta_axum::gateway::{
    client::EtaClient,
    config::{CliArgs, GatewayConfig},
    routes::{AppState, router},
    telemetry::init_telemetry,
};
use tokio::{net::TcpListener, signal};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = GatewayConfig::try_from(args)?;

    init_telemetry(config.is_production())?;

    let client = EtaClient::new(
        config.upstream_uri.clone(),
        config.timeout,
        config.connect_timeout,
    );
    let app = router(AppState::new(client));

    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(
        "Starting ETA gateway on {} (upstream {}, timeout {} ms)",
        config.listen_addr,
        config.upstream_uri,
        config.timeout.as_millis()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway shut down successfully");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
