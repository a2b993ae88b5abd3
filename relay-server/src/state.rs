use weather_relay_core::WeatherNormalizer;

/// Shared router state. Immutable; requests never write to it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub normalizer: WeatherNormalizer,
}
