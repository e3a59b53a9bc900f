//! Error types for ETA estimation.
//!
//! Every fallible operation in this crate returns [`Error`]. Nothing is
//! swallowed on the way up: lookup failures surface unchanged through the
//! calculator and the cache so the outermost boundary can decide how to
//! present them.

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors the ETA engine can produce.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Latitude or longitude was outside its declared range, or not a finite
    /// number.
    #[error(
        "Latitude and longitude must be degrees within -90..90 and -180..180 (got {latitude}, {longitude})"
    )]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The nearest-vehicle lookup returned no candidates.
    #[error("No available vehicles near the requested point")]
    NoVehiclesAvailable,

    /// The spatial store could not be queried or returned unusable data.
    #[error("Vehicle lookup failed: {context}")]
    Lookup { context: String },

    /// The spatial store did not answer within the configured deadline.
    #[error("Vehicle lookup timed out after {timeout_ms} ms")]
    LookupTimeout { timeout_ms: u64 },
}

impl Error {
    /// Returns `true` if the error was caused by the caller's input.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCoordinates { .. })
    }
}
