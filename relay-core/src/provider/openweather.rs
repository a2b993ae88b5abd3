use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{config::UpstreamConfig, error::WeatherError, model::Coordinate};

use super::WeatherSource;

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const DIRECT_GEOCODE_PATH: &str = "/geo/1.0/direct";
const REVERSE_GEOCODE_PATH: &str = "/geo/1.0/reverse";

/// Number of 3-hour samples requested from the forecast endpoint (5 days).
const FORECAST_SAMPLE_COUNT: u32 = 40;

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String, settings: &UpstreamConfig) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| WeatherError::Transport {
                endpoint: "client setup",
                source,
            })?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            units: settings.units.clone(),
            lang: settings.lang.clone(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint, %url, "calling OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(WeatherError::UpstreamStatus {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode { endpoint, source })
    }

    fn weather_params(&self, coord: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coord.lat.to_string()),
            ("lon", coord.lon.to_string()),
            ("units", self.units.clone()),
            ("lang", self.lang.clone()),
        ]
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current(&self, coord: Coordinate) -> Result<OwCurrentResponse, WeatherError> {
        let params = self.weather_params(coord);
        self.get_json("current weather", CURRENT_PATH, &params).await
    }

    async fn forecast(&self, coord: Coordinate) -> Result<OwForecastResponse, WeatherError> {
        let mut params = self.weather_params(coord);
        params.push(("cnt", FORECAST_SAMPLE_COUNT.to_string()));
        self.get_json("forecast", FORECAST_PATH, &params).await
    }

    async fn direct_geocode(&self, city: &str, limit: u8) -> Result<Vec<OwPlace>, WeatherError> {
        let params = [("q", city.to_string()), ("limit", limit.to_string())];
        self.get_json("direct geocoding", DIRECT_GEOCODE_PATH, &params)
            .await
    }

    async fn reverse_geocode(
        &self,
        coord: Coordinate,
        limit: u8,
    ) -> Result<Vec<OwPlace>, WeatherError> {
        let params = [
            ("lat", coord.lat.to_string()),
            ("lon", coord.lon.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get_json("reverse geocoding", REVERSE_GEOCODE_PATH, &params)
            .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    pub main: OwCurrentMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: Option<OwWind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwSampleMain {
    pub temp: f64,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyTemp {
    pub day: f64,
    pub min: f64,
    pub max: f64,
}

/// One forecast sample. The 5-day endpoint returns 3-hourly samples under
/// `list`; the one-call endpoint returns daily aggregates under `daily`.
///
/// A sample matching neither shape is kept as `Malformed` so one bad entry
/// does not sink the whole response. It is never noon and cannot be turned
/// into a daily entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OwForecastSample {
    ThreeHourly {
        dt: i64,
        #[serde(default)]
        dt_txt: Option<String>,
        main: OwSampleMain,
        #[serde(default)]
        weather: Vec<OwWeather>,
    },
    Daily {
        dt: i64,
        temp: OwDailyTemp,
        #[serde(default)]
        weather: Vec<OwWeather>,
    },
    Malformed(serde_json::Value),
}

impl OwForecastSample {
    pub fn dt(&self) -> Option<i64> {
        match self {
            Self::ThreeHourly { dt, .. } | Self::Daily { dt, .. } => Some(*dt),
            Self::Malformed(raw) => raw.get("dt").and_then(serde_json::Value::as_i64),
        }
    }

    /// `(temp, min, max)`; missing bounds fall back to the sample temperature.
    pub fn temperatures(&self) -> Option<(f64, f64, f64)> {
        match self {
            Self::ThreeHourly { main, .. } => Some((
                main.temp,
                main.temp_min.unwrap_or(main.temp),
                main.temp_max.unwrap_or(main.temp),
            )),
            Self::Daily { temp, .. } => Some((temp.day, temp.min, temp.max)),
            Self::Malformed(_) => None,
        }
    }

    pub fn conditions(&self) -> Option<&OwWeather> {
        match self {
            Self::ThreeHourly { weather, .. } | Self::Daily { weather, .. } => weather.first(),
            Self::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// True when the sample's text stamp reads `YYYY-MM-DD 12:00:00`.
    pub fn is_noon(&self) -> bool {
        let Self::ThreeHourly {
            dt_txt: Some(stamp),
            ..
        } = self
        else {
            return false;
        };

        NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
            .map(|ts| Some(ts.time()) == NaiveTime::from_hms_opt(12, 0, 0))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    #[serde(alias = "daily", default)]
    pub list: Vec<OwForecastSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
}

impl OwPlace {
    /// `"name, country"`, or just the name when the country is unknown.
    pub fn display_name(&self) -> String {
        match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
