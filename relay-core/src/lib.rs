//! Core library for the weather relay backend.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream source abstraction and its OpenWeather implementation
//! - Normalization of upstream payloads into one output schema
//! - The [`WeatherNormalizer`] that assembles full reports
//!
//! It is used by the `weather-relay` server, but carries no HTTP-server code itself.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use error::WeatherError;
pub use model::{
    Coordinate, CurrentConditions, DailyForecastEntry, LocationQuery, ResolvedLocation,
    WeatherReport,
};
pub use provider::{WeatherSource, source_from_config};
pub use service::{Enrichment, WeatherNormalizer};
