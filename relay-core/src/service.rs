use std::sync::Arc;

use crate::{
    Config,
    error::WeatherError,
    model::{
        Coordinate, CurrentConditions, DailyForecastEntry, LocationQuery, ResolvedLocation,
        WeatherReport,
    },
    normalize,
    provider::{WeatherSource, source_from_config},
};

/// Geocoding lookups only ever use the best match.
const GEOCODE_LIMIT: u8 = 1;

/// Outcome of an enrichment call: either the real value or a documented
/// fallback standing in for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Resolved(T),
    Degraded { fallback: T, reason: String },
}

impl<T> Enrichment<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Resolved(value) | Self::Degraded { fallback: value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Builds [`WeatherReport`]s from the upstream source.
///
/// Current conditions and forward geocoding are essential: their failures are
/// returned. Reverse geocoding and the forecast are enrichment and degrade.
#[derive(Debug, Clone)]
pub struct WeatherNormalizer {
    source: Option<Arc<dyn WeatherSource>>,
}

impl WeatherNormalizer {
    /// A normalizer without an API key is valid; every call on it fails with
    /// [`WeatherError::Configuration`].
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        match source_from_config(config) {
            Ok(source) => Ok(Self::with_source(source)),
            Err(WeatherError::Configuration) => Ok(Self::unconfigured()),
            Err(err) => Err(err),
        }
    }

    pub fn with_source(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    pub fn unconfigured() -> Self {
        Self { source: None }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    fn source(&self) -> Result<&dyn WeatherSource, WeatherError> {
        self.source.as_deref().ok_or(WeatherError::Configuration)
    }

    pub async fn resolve_location(
        &self,
        query: &LocationQuery,
    ) -> Result<ResolvedLocation, WeatherError> {
        let source = self.source()?;
        match query {
            LocationQuery::Coordinate(coord) => Ok(ResolvedLocation {
                name: reverse_name(source, *coord).await.into_inner(),
                coordinate: *coord,
            }),
            LocationQuery::City(city) => forward_geocode(source, city).await,
        }
    }

    pub async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions, WeatherError> {
        fetch_current(self.source()?, coord).await
    }

    pub async fn fetch_forecast(
        &self,
        coord: Coordinate,
    ) -> Result<Enrichment<Vec<DailyForecastEntry>>, WeatherError> {
        Ok(fetch_forecast(self.source()?, coord).await)
    }

    pub async fn get_weather_report(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherReport, WeatherError> {
        let source = self.source()?;
        let location = self.resolve_location(query).await?;
        let coord = location.coordinate;

        let (current, forecast) = tokio::join!(
            fetch_current(source, coord),
            fetch_forecast(source, coord)
        );

        let daily = match forecast {
            Enrichment::Resolved(daily) => daily,
            Enrichment::Degraded { fallback, reason } => {
                tracing::warn!(%reason, location = %location.name, "forecast unavailable");
                fallback
            }
        };

        Ok(WeatherReport {
            location,
            current: current?,
            daily,
        })
    }
}

async fn forward_geocode(
    source: &dyn WeatherSource,
    city: &str,
) -> Result<ResolvedLocation, WeatherError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(WeatherError::InvalidQuery("city name is empty".to_string()));
    }

    let places = source.direct_geocode(city, GEOCODE_LIMIT).await?;
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::NotFound(city.to_string()))?;

    tracing::debug!(city, resolved = %place.display_name(), "forward geocoded");
    Ok(ResolvedLocation {
        name: place.display_name(),
        coordinate: place.coordinate(),
    })
}

async fn reverse_name(source: &dyn WeatherSource, coord: Coordinate) -> Enrichment<String> {
    let reason = match source.reverse_geocode(coord, GEOCODE_LIMIT).await {
        Ok(places) => match places.first() {
            Some(place) => return Enrichment::Resolved(place.display_name()),
            None => "no reverse geocoding match".to_string(),
        },
        Err(err) => err.to_string(),
    };

    tracing::debug!(%reason, lat = coord.lat, lon = coord.lon, "using coordinate label");
    Enrichment::Degraded {
        fallback: coord.label(),
        reason,
    }
}

async fn fetch_current(
    source: &dyn WeatherSource,
    coord: Coordinate,
) -> Result<CurrentConditions, WeatherError> {
    let raw = source.current(coord).await?;
    normalize::current_conditions(raw)
}

async fn fetch_forecast(
    source: &dyn WeatherSource,
    coord: Coordinate,
) -> Enrichment<Vec<DailyForecastEntry>> {
    let daily = match source.forecast(coord).await {
        Ok(raw) => normalize::daily_forecast(&raw),
        Err(err) => Err(err),
    };

    match daily {
        Ok(daily) => Enrichment::Resolved(daily),
        Err(err) => Enrichment::Degraded {
            fallback: Vec::new(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::openweather::{OwCurrentResponse, OwForecastResponse, OwPlace};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned upstream. `None` means the endpoint answers HTTP 500.
    #[derive(Debug, Default)]
    struct FakeSource {
        current: Option<serde_json::Value>,
        forecast: Option<serde_json::Value>,
        direct: Option<Vec<OwPlace>>,
        reverse: Option<Vec<OwPlace>>,
        calls: AtomicUsize,
    }

    fn server_error(endpoint: &'static str) -> WeatherError {
        WeatherError::UpstreamStatus {
            endpoint,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, _coord: Coordinate) -> Result<OwCurrentResponse, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let value = self.current.clone().ok_or_else(|| server_error("current weather"))?;
            Ok(serde_json::from_value(value).unwrap())
        }

        async fn forecast(&self, _coord: Coordinate) -> Result<OwForecastResponse, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let value = self.forecast.clone().ok_or_else(|| server_error("forecast"))?;
            Ok(serde_json::from_value(value).unwrap())
        }

        async fn direct_geocode(
            &self,
            _city: &str,
            limit: u8,
        ) -> Result<Vec<OwPlace>, WeatherError> {
            assert_eq!(limit, 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.direct.clone().ok_or_else(|| server_error("direct geocoding"))
        }

        async fn reverse_geocode(
            &self,
            _coord: Coordinate,
            limit: u8,
        ) -> Result<Vec<OwPlace>, WeatherError> {
            assert_eq!(limit, 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reverse.clone().ok_or_else(|| server_error("reverse geocoding"))
        }
    }

    fn current_payload() -> serde_json::Value {
        json!({
            "main": { "temp": 21.46, "feels_like": 20.04, "humidity": 40, "pressure": 1018 },
            "weather": [{ "description": "ясно", "icon": "01d" }],
            "wind": { "speed": 2.5 }
        })
    }

    fn forecast_payload() -> serde_json::Value {
        json!({ "list": [
            {
                "dt": 1_700_049_600,
                "dt_txt": "2023-11-15 12:00:00",
                "main": { "temp": 8.04, "temp_min": 7.0, "temp_max": 9.0 },
                "weather": [{ "description": "облачно", "icon": "04d" }]
            }
        ]})
    }

    fn paris() -> OwPlace {
        OwPlace {
            name: "Paris".into(),
            lat: 48.8566,
            lon: 2.3522,
            country: Some("FR".into()),
        }
    }

    fn normalizer(source: FakeSource) -> (WeatherNormalizer, Arc<FakeSource>) {
        let source = Arc::new(source);
        (WeatherNormalizer::with_source(source.clone()), source)
    }

    #[tokio::test]
    async fn unconfigured_normalizer_fails_every_operation() {
        let n = WeatherNormalizer::from_config(&Config::default()).unwrap();
        assert!(!n.is_configured());

        let coord = Coordinate::new(1.0, 2.0);
        let err = n
            .get_weather_report(&LocationQuery::Coordinate(coord))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Configuration));
        assert!(matches!(
            n.fetch_current(coord).await,
            Err(WeatherError::Configuration)
        ));
        assert!(matches!(
            n.fetch_forecast(coord).await,
            Err(WeatherError::Configuration)
        ));
    }

    #[tokio::test]
    async fn city_resolves_to_first_match() {
        let (n, _) = normalizer(FakeSource {
            direct: Some(vec![paris()]),
            ..Default::default()
        });

        let loc = n
            .resolve_location(&LocationQuery::City("Paris".into()))
            .await
            .unwrap();
        assert_eq!(loc.name, "Paris, FR");
        assert!((loc.coordinate.lat - 48.8566).abs() < 1e-9);
        assert!((loc.coordinate.lon - 2.3522).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_geocoding_result_is_not_found() {
        let (n, source) = normalizer(FakeSource {
            direct: Some(vec![]),
            current: Some(current_payload()),
            ..Default::default()
        });

        let err = n
            .get_weather_report(&LocationQuery::City("Atlantis".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(ref city) if city == "Atlantis"));
        // Nothing past geocoding is attempted.
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_city_is_rejected_without_upstream_call() {
        let (n, source) = normalizer(FakeSource::default());

        let err = n
            .resolve_location(&LocationQuery::City("  ".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidQuery(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forward_geocoding_failure_is_upstream_error() {
        let (n, _) = normalizer(FakeSource::default());

        let err = n
            .resolve_location(&LocationQuery::City("Paris".into()))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn reverse_geocoding_failure_falls_back_to_label() {
        let (n, _) = normalizer(FakeSource::default());

        let loc = n
            .resolve_location(&LocationQuery::Coordinate(Coordinate::new(55.7558, 37.6176)))
            .await
            .unwrap();
        assert_eq!(loc.name, "55.7558, 37.6176");
    }

    #[tokio::test]
    async fn reverse_geocoding_without_match_is_degraded() {
        let source = FakeSource {
            reverse: Some(vec![]),
            ..Default::default()
        };

        let name = reverse_name(&source, Coordinate::new(10.0, 20.0)).await;
        assert!(name.is_degraded());
        assert_eq!(name.into_inner(), "10.0000, 20.0000");
    }

    #[tokio::test]
    async fn forecast_failure_degrades_to_empty() {
        let (n, _) = normalizer(FakeSource {
            reverse: Some(vec![paris()]),
            current: Some(current_payload()),
            ..Default::default()
        });

        let report = n
            .get_weather_report(&LocationQuery::Coordinate(Coordinate::new(48.8566, 2.3522)))
            .await
            .unwrap();
        assert_eq!(report.location.name, "Paris, FR");
        assert!(report.daily.is_empty());
        assert_eq!(report.current.temperature, 21.5);
        assert_eq!(report.current.description, "Ясно");
    }

    #[tokio::test]
    async fn current_failure_fails_report() {
        let (n, _) = normalizer(FakeSource {
            reverse: Some(vec![paris()]),
            forecast: Some(forecast_payload()),
            ..Default::default()
        });

        let err = n
            .get_weather_report(&LocationQuery::Coordinate(Coordinate::new(48.8566, 2.3522)))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn full_report_is_assembled() {
        let (n, _) = normalizer(FakeSource {
            direct: Some(vec![paris()]),
            current: Some(current_payload()),
            forecast: Some(forecast_payload()),
            ..Default::default()
        });

        let report = n
            .get_weather_report(&LocationQuery::City("Paris".into()))
            .await
            .unwrap();
        assert_eq!(report.location.name, "Paris, FR");
        assert_eq!(report.current.feels_like, 20.0);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].temperature, 8.0);
        assert_eq!(report.daily[0].description, "Облачно");
    }

    #[tokio::test]
    async fn malformed_forecast_degrades() {
        let source = FakeSource {
            forecast: Some(json!({ "list": [
                { "dt": 1, "dt_txt": "2023-11-15 12:00:00", "main": { "temp": 1.0 }, "weather": [] }
            ]})),
            ..Default::default()
        };

        let daily = fetch_forecast(&source, Coordinate::new(0.0, 0.0)).await;
        assert!(daily.is_degraded());
        assert!(daily.into_inner().is_empty());
    }
}
