use crate::{
    Config,
    error::WeatherError,
    model::Coordinate,
    provider::openweather::{OpenWeatherSource, OwCurrentResponse, OwForecastResponse, OwPlace},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Raw access to the upstream weather and geocoding endpoints.
///
/// Implementations return upstream payloads as decoded; shaping them into the
/// relay's output schema is left to [`crate::normalize`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, coord: Coordinate) -> Result<OwCurrentResponse, WeatherError>;

    async fn forecast(&self, coord: Coordinate) -> Result<OwForecastResponse, WeatherError>;

    async fn direct_geocode(&self, city: &str, limit: u8) -> Result<Vec<OwPlace>, WeatherError>;

    async fn reverse_geocode(
        &self,
        coord: Coordinate,
        limit: u8,
    ) -> Result<Vec<OwPlace>, WeatherError>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> Result<Arc<dyn WeatherSource>, WeatherError> {
    let api_key = config.api_key().ok_or(WeatherError::Configuration)?;
    let source = OpenWeatherSource::new(api_key.to_owned(), &config.upstream)?;
    Ok(Arc::new(source))
}
