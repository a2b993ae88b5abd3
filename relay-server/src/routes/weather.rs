use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use weather_relay_core::{Coordinate, LocationQuery, WeatherReport};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CoordinateRequest {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct CityRequest {
    pub city: String,
}

/// POST /api/weather
///
/// Report for a coordinate; the location name comes from reverse geocoding.
pub async fn weather_by_coordinate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CoordinateRequest>,
) -> Result<Json<WeatherReport>, AppError> {
    let query = LocationQuery::Coordinate(Coordinate::new(req.lat, req.lon));
    let report = state.normalizer.get_weather_report(&query).await?;
    Ok(Json(report))
}

/// POST /api/weather/city
///
/// Report for a city name, resolved through forward geocoding first.
pub async fn weather_by_city(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CityRequest>,
) -> Result<Json<WeatherReport>, AppError> {
    let query = LocationQuery::City(req.city);
    let report = state.normalizer.get_weather_report(&query).await?;
    Ok(Json(report))
}
