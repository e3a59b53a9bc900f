use crate::gateway::{client::EtaClient, error::GatewayError};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use eta_tonic_core::eta::GeoPoint;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug)]
pub struct AppState {
    client: EtaClient,
}

impl AppState {
    pub const fn new(client: EtaClient) -> Self {
        Self { client }
    }
}

/// Raw query parameters. Kept as strings so missing and non-numeric values
/// produce this gateway's error body instead of the extractor's.
#[derive(Debug, Default, Deserialize)]
pub struct EtaQuery {
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EtaBody {
    pub eta: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(eta))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn eta(
    State(state): State<AppState>,
    query: Result<Query<EtaQuery>, QueryRejection>,
) -> Result<Json<EtaBody>, GatewayError> {
    let Query(query) = query.map_err(|err| GatewayError::Validation(err.body_text()))?;
    let point = parse_point(&query)?;

    match state.client.eta(point).await {
        Ok(eta) => Ok(Json(EtaBody { eta })),
        Err(err) => {
            tracing::warn!(error = %err, "ETA service call failed");
            Err(err.into())
        }
    }
}

fn parse_point(query: &EtaQuery) -> Result<GeoPoint, GatewayError> {
    let latitude = parse_coordinate("latitude", query.latitude.as_deref())?;
    let longitude = parse_coordinate("longitude", query.longitude.as_deref())?;
    GeoPoint::new(latitude, longitude).map_err(|err| GatewayError::Validation(err.to_string()))
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, GatewayError> {
    let raw = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| GatewayError::Validation(format!("Missing query parameter `{name}`")))?;
    raw.parse::<f64>()
        .map_err(|_| GatewayError::Validation(format!("Query parameter `{name}` must be a number")))
}
