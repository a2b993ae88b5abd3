use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use weather_relay_core::WeatherError;

/// Error rendered as a JSON `{"error": "..."}` response with a matching status.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match &e {
            WeatherError::NotFound(_) => AppError::not_found(e.to_string()),
            WeatherError::InvalidQuery(_) => AppError::bad_request(e.to_string()),
            _ if e.is_upstream() => {
                tracing::error!(error = %e, "upstream weather call failed");
                AppError::bad_gateway(e.to_string())
            }
            _ => {
                tracing::error!(error = %e, "weather request rejected");
                AppError::internal(e.to_string())
            }
        }
    }
}
