#![doc = include_str!("../README.md")]

use clap::Parser;
use eta_tonic_core::eta::{EtaCache, EtaCalculator};
use eta_tonic_server::server::{
    config::{CliArgs, ServerConfig},
    run::run_server_with_incoming,
    service::handler::EtaService,
    store::PgVehicleStore,
    telemetry::init_telemetry,
};
use tokio::{net::TcpListener, signal};
use tokio_stream::wrappers::TcpListenerStream;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry(config.is_production())?;

    let store = PgVehicleStore::connect_lazy(
        &config.database_url,
        config.db_max_connections,
        config.lookup_timeout,
    )?;
    let calculator = EtaCalculator::new(store)
        .with_multiplier(config.multiplier)
        .with_lookup_timeout(config.lookup_timeout);
    let service = EtaService::new(EtaCache::new(calculator, config.cache));

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config);

    let result = run_server_with_incoming(
        service,
        TcpListenerStream::new(listener),
        config.request_timeout,
        shutdown_signal(),
    )
    .await;

    providers.shutdown();
    result
}

fn log_startup_info(config: &ServerConfig) {
    if config.is_production() {
        tracing::info!(
            "Starting ETA service on {} (multiplier {}, cache {}s)",
            config.server_addr,
            config.multiplier,
            config.cache.expiration.as_secs()
        );
    } else {
        tracing::info!(
            "Starting ETA service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    }
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

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
