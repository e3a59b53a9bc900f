use anyhow::bail;
use clap::Parser;
use core::{fmt, time::Duration};
use eta_tonic_core::{
    eta::{CacheConfig, MAX_PRECISION},
    types::join_host_port,
};

/// Runtime configuration for the `eta-tonic-server` binary.
///
/// Every setting can be passed as a CLI flag or through the environment (a
/// `.env` file is loaded first), with defaults suitable for a single-node
/// deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "eta-tonic-server",
    version,
    about = "A gRPC service estimating arrival times of the nearest vehicles"
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
    #[arg(long, env = "PORT", default_value_t = eta_tonic_core::types::DEFAULT_SERVICE_PORT)]
    pub port: u16,

    /// PostGIS connection string holding the `vehicles` table.
    ///
    /// The pool connects lazily, so the server starts even if the database is
    /// not reachable yet; lookups fail with `UNAVAILABLE` until it is.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Minutes-per-kilometer factor applied to the mean distance.
    ///
    /// Environment variable: `MULTIPLIER`
    #[arg(long, env = "MULTIPLIER", default_value_t = eta_tonic_core::eta::DEFAULT_MULTIPLIER)]
    pub multiplier: f64,

    /// Seconds a computed ETA is served from cache.
    ///
    /// Environment variable: `CACHE_EXPIRATION_TIME`
    #[arg(long, env = "CACHE_EXPIRATION_TIME", default_value_t = 15)]
    pub cache_expiration_time: u64,

    /// Decimal places of latitude/longitude kept in cache keys.
    ///
    /// 3 places is about 111 meters per axis at the equator. Points that
    /// round to the same key share an ETA.
    ///
    /// Environment variable: `CACHE_COORD_PRECISION`
    #[arg(long, env = "CACHE_COORD_PRECISION", default_value_t = eta_tonic_core::eta::DEFAULT_PRECISION)]
    pub cache_coord_precision: u32,

    /// Upper bound on cached keys.
    ///
    /// Environment variable: `CACHE_MAX_ENTRIES`
    #[arg(long, env = "CACHE_MAX_ENTRIES", default_value_t = eta_tonic_core::eta::DEFAULT_MAX_ENTRIES)]
    pub cache_max_entries: usize,

    /// Deadline, in milliseconds, for a single nearest-vehicle query.
    ///
    /// Environment variable: `LOOKUP_TIMEOUT_MS`
    #[arg(long, env = "LOOKUP_TIMEOUT_MS", default_value_t = 5_000)]
    pub lookup_timeout_ms: u64,

    /// Maximum number of pooled database connections.
    ///
    /// Environment variable: `DB_MAX_CONNECTIONS`
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 8)]
    pub db_max_connections: u32,

    /// Server-side deadline, in milliseconds, for a whole RPC. A shorter
    /// `grpc-timeout` sent by the client takes precedence.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Deployment environment. `production` logs at `info`, anything else at
    /// `debug`. `RUST_LOG` overrides both.
    ///
    /// Environment variable: `ENV`
    #[arg(long = "env", env = "ENV", default_value_t = String::from("development"))]
    pub environment: String,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub database_url: String,
    pub multiplier: f64,
    pub cache: CacheConfig,
    pub lookup_timeout: Duration,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
    pub environment: String,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Keeps credentials in `DATABASE_URL` out of startup logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("server_addr", &self.server_addr)
            .field("database_url", &"<redacted>")
            .field("multiplier", &self.multiplier)
            .field("cache", &self.cache)
            .field("lookup_timeout", &self.lookup_timeout)
            .field("db_max_connections", &self.db_max_connections)
            .field("request_timeout", &self.request_timeout)
            .field("environment", &self.environment)
            .finish()
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !args.multiplier.is_finite() || args.multiplier < 0.0 {
            bail!(
                "MULTIPLIER must be a finite, non-negative number (got {})",
                args.multiplier
            );
        }

        if args.cache_coord_precision > MAX_PRECISION {
            bail!(
                "CACHE_COORD_PRECISION ({}) exceeds the supported maximum ({MAX_PRECISION})",
                args.cache_coord_precision
            );
        }

        if args.cache_max_entries == 0 {
            bail!("CACHE_MAX_ENTRIES must be greater than 0");
        }

        if args.lookup_timeout_ms == 0 {
            bail!("LOOKUP_TIMEOUT_MS must be greater than 0");
        }

        if args.request_timeout_ms == 0 {
            bail!("REQUEST_TIMEOUT_MS must be greater than 0");
        }

        if args.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than 0");
        }

        if args.database_url.trim().is_empty() {
            bail!("DATABASE_URL must not be empty");
        }

        Ok(Self {
            server_addr: join_host_port(&args.listen, args.port),
            database_url: args.database_url,
            multiplier: args.multiplier,
            cache: CacheConfig {
                expiration: Duration::from_secs(args.cache_expiration_time),
                precision: args.cache_coord_precision,
                max_entries: args.cache_max_entries,
            },
            lookup_timeout: Duration::from_millis(args.lookup_timeout_ms),
            db_max_connections: args.db_max_connections,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            environment: args.environment,
        })
    }
}
