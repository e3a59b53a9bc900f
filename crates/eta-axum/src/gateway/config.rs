use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use eta_tonic_core::types::{DEFAULT_SERVICE_PORT, join_host_port};
use tonic::transport::Uri;

pub const DEFAULT_GATEWAY_PORT: u16 = 4567;

/// Runtime configuration for the `eta-axum` gateway.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "eta-axum",
    version,
    about = "HTTP gateway in front of the ETA gRPC service"
)]
pub struct CliArgs {
    /// Host or IP address to listen on.
    ///
    /// Environment variable: `LISTEN`
    #[arg(long, env = "LISTEN", default_value_t = String::from("0.0.0.0"))]
    pub listen: String,

    /// TCP port to listen on.
    ///
    /// Environment variable: `PORT`
    #[arg(long, env = "PORT", default_value_t = DEFAULT_GATEWAY_PORT)]
    pub port: u16,

    /// Host of the ETA gRPC service.
    ///
    /// Environment variable: `ETA_SERVICE_HOST`
    #[arg(long, env = "ETA_SERVICE_HOST", default_value_t = String::from("127.0.0.1"))]
    pub eta_service_host: String,

    /// Port of the ETA gRPC service.
    ///
    /// Environment variable: `ETA_SERVICE_PORT`
    #[arg(long, env = "ETA_SERVICE_PORT", default_value_t = DEFAULT_SERVICE_PORT)]
    pub eta_service_port: u16,

    /// Deadline, in milliseconds, for one call to the ETA service. Also sent
    /// upstream as `grpc-timeout`.
    ///
    /// Environment variable: `ETA_SERVICE_TIMEOUT_MS`
    #[arg(long, env = "ETA_SERVICE_TIMEOUT_MS", default_value_t = 1_000)]
    pub eta_service_timeout_ms: u64,

    /// Deadline, in milliseconds, for establishing a connection to the ETA
    /// service.
    ///
    /// Environment variable: `ETA_SERVICE_CONNECT_TIMEOUT_MS`
    #[arg(long, env = "ETA_SERVICE_CONNECT_TIMEOUT_MS", default_value_t = 1_000)]
    pub eta_service_connect_timeout_ms: u64,

    /// Deployment environment. `production` logs at `info`, anything else at
    /// `debug`.
    ///
    /// Environment variable: `ENV`
    #[arg(long = "env", env = "ENV", default_value_t = String::from("development"))]
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: String,
    pub upstream_uri: Uri,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub environment: String,
}

impl GatewayConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl TryFrom<CliArgs> for GatewayConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.eta_service_timeout_ms == 0 {
            bail!("ETA_SERVICE_TIMEOUT_MS must be greater than 0");
        }

        if args.eta_service_connect_timeout_ms == 0 {
            bail!("ETA_SERVICE_CONNECT_TIMEOUT_MS must be greater than 0");
        }

        let upstream = format!(
            "http://{}",
            join_host_port(&args.eta_service_host, args.eta_service_port)
        );
        let upstream_uri = upstream
            .parse::<Uri>()
            .with_context(|| format!("invalid ETA service address `{upstream}`"))?;

        Ok(Self {
            listen_addr: join_host_port(&args.listen, args.port),
            upstream_uri,
            timeout: Duration::from_millis(args.eta_service_timeout_ms),
            connect_timeout: Duration::from_millis(args.eta_service_connect_timeout_ms),
            environment: args.environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> anyhow::Result<GatewayConfig> {
        let argv = core::iter::once("eta-axum").chain(argv.iter().copied());
        GatewayConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_point_at_local_service() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:4567");
        assert_eq!(config.upstream_uri.scheme_str(), Some("http"));
        assert_eq!(
            config.upstream_uri.authority().map(|a| a.as_str()),
            Some("127.0.0.1:4568")
        );
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert!(!config.is_production());
    }

    #[test]
    fn ipv6_upstream_is_bracketed() {
        let config = parse(&["--eta-service-host", "::1", "--eta-service-port", "9000"]).unwrap();
        assert_eq!(
            config.upstream_uri.authority().map(|a| a.as_str()),
            Some("[::1]:9000")
        );
    }

    #[test]
    fn rejects_zero_timeouts_and_bad_hosts() {
        assert!(parse(&["--eta-service-timeout-ms", "0"]).is_err());
        assert!(parse(&["--eta-service-connect-timeout-ms", "0"]).is_err());
        assert!(parse(&["--eta-service-host", "bad host"]).is_err());
    }
}
