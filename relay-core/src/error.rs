use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the normalizer.
///
/// Enrichment lookups (reverse geocoding, forecast) never produce one of these;
/// they degrade through [`crate::Enrichment`] instead.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "OpenWeather API key is not configured.\n\
         Hint: set OPENWEATHER_API_KEY or run `weather-relay configure`."
    )]
    Configuration,

    #[error("City not found: {0}")]
    NotFound(String),

    #[error("Invalid location query: {0}")]
    InvalidQuery(String),

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    UpstreamStatus {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to send request to OpenWeather ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("OpenWeather {endpoint} response is malformed: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
}

impl WeatherError {
    /// True for every failure that originates from an upstream call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. }
                | Self::Transport { .. }
                | Self::Decode { .. }
                | Self::Malformed { .. }
        )
    }

    pub(crate) fn malformed(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint,
            reason: reason.into(),
        }
    }
}
