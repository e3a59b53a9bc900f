use crate::server::service::handler::{EtaService, build_eta_service};
use core::time::Duration;
use eta_tonic_core::{
    eta::NearestVehicleLookup,
    proto::{FILE_DESCRIPTOR_SET, eta_estimator_server::EtaEstimatorServer},
};
use futures::Stream;
use tokio::io::{AsyncRead, AsyncWrite};
use tonic::transport::{Server, server::Connected};

/// Serves the ETA service, health checks and reflection on `incoming` until
/// `signal` resolves.
///
/// On shutdown the health status flips to `NOT_SERVING` and the service
/// rejects new requests before in-flight ones are drained.
pub async fn run_server_with_incoming<L, I, IO, IE, F>(
    service: EtaService<L>,
    incoming: I,
    request_timeout: Duration,
    signal: F,
) -> anyhow::Result<()>
where
    L: NearestVehicleLookup + 'static,
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Future<Output = ()>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<EtaEstimatorServer<EtaService<L>>>()
        .await;

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let shutdown = {
        let service = service.clone();
        async move {
            signal.await;
            health_reporter
                .set_not_serving::<EtaEstimatorServer<EtaService<L>>>()
                .await;
            service.shutdown();
        }
    };

    Server::builder()
        .timeout(request_timeout)
        .http2_adaptive_window(Some(true))
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_eta_service(service))
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}
