use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// WGS84 position in degrees. Range checks are left to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Display name used when no place name is known, e.g. `"55.7558, 37.6176"`.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinate(Coordinate),
    /// Free-text city name, resolved through forward geocoding.
    City(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    #[serde(rename = "weather")]
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    /// Unix timestamp (seconds) of the representative sample.
    pub dt: i64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub min: f64,
    pub max: f64,
    #[serde(rename = "weather")]
    pub description: String,
    pub icon: String,
}

impl DailyForecastEntry {
    /// UTC calendar day of the sample.
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.dt, 0).map(|ts| ts.date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: ResolvedLocation,
    pub current: CurrentConditions,
    /// At most five entries, oldest first.
    pub daily: Vec<DailyForecastEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_four_decimals() {
        assert_eq!(Coordinate::new(55.7558, 37.6176).label(), "55.7558, 37.6176");
        assert_eq!(Coordinate::new(1.0, -2.5).label(), "1.0000, -2.5000");
    }

    #[test]
    fn report_serializes_with_client_field_names() {
        let report = WeatherReport {
            location: ResolvedLocation {
                name: "Paris, FR".into(),
                coordinate: Coordinate::new(48.8566, 2.3522),
            },
            current: CurrentConditions {
                temperature: 18.3,
                feels_like: 17.9,
                humidity: 60,
                pressure: 1015,
                wind_speed: 3.1,
                description: "Ясно".into(),
                icon: "01d".into(),
            },
            daily: vec![DailyForecastEntry {
                dt: 1_700_049_600,
                temperature: 12.0,
                min: 10.5,
                max: 13.2,
                description: "Облачно".into(),
                icon: "04d".into(),
            }],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["location"]["name"], "Paris, FR");
        assert_eq!(value["location"]["lat"], 48.8566);
        assert_eq!(value["location"]["lon"], 2.3522);
        assert_eq!(value["current"]["temp"], 18.3);
        assert_eq!(value["current"]["weather"], "Ясно");
        assert_eq!(value["daily"][0]["dt"], 1_700_049_600);
        assert_eq!(value["daily"][0]["weather"], "Облачно");
    }

    #[test]
    fn daily_entry_date_is_utc_day() {
        let entry = DailyForecastEntry {
            dt: 1_700_049_600, // 2023-11-15 12:00:00 UTC
            temperature: 0.0,
            min: 0.0,
            max: 0.0,
            description: String::new(),
            icon: String::new(),
        };
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2023, 11, 15));
    }
}
