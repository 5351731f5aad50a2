use axum::Json;
use serde::Deserialize;

use crate::core::forecast::{self, ForecastReport};

#[derive(Deserialize)]
pub struct ForecastRequest {
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub async fn forecast_endpoint(Json(payload): Json<ForecastRequest>) -> Json<ForecastReport> {
    Json(forecast::generate(
        &payload.location,
        payload.latitude,
        payload.longitude,
    ))
}

#[derive(Deserialize)]
pub struct ExtendedForecastRequest {
    location: String,
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

pub async fn extended_forecast_endpoint(
    Json(payload): Json<ExtendedForecastRequest>,
) -> Json<Vec<ForecastReport>> {
    let days = payload.days.clamp(1, 14);
    Json(forecast::extended(&payload.location, days))
}
