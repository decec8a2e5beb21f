use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use weatherblock_core::{WeatherError, WeatherSnapshot};

/// Query parameters for `GET /weather`.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Body for `PUT /admin/credential`.
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

/// Success envelope for weather responses.
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    pub data: WeatherSnapshot,
}

impl WeatherResponse {
    pub fn new(data: WeatherSnapshot) -> Self {
        Self { success: true, data }
    }
}

/// Error payload returned to HTTP callers.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip)]
    pub retry_after_secs: Option<u64>,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            retry_after_secs: None,
            code: "invalid_input",
            message: message.into(),
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        let status = match &err {
            WeatherError::InvalidInput(_) | WeatherError::MissingCredential => {
                StatusCode::BAD_REQUEST
            }
            WeatherError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            WeatherError::Transport(_)
            | WeatherError::Provider { .. }
            | WeatherError::MalformedResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let retry_after_secs = match &err {
            WeatherError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        Self {
            status,
            retry_after_secs,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let retry_after = self.retry_after_secs;

        let mut response = (status, Json(self)).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Rate-limit key for a caller: hex SHA-256 of the peer IP, so raw
/// addresses never appear as store keys or in logs.
pub fn client_key_for(addr: &SocketAddr) -> String {
    let mut hasher = Sha256::new();
    hasher.update(addr.ip().to_string());
    format!("{:x}", hasher.finalize())
}
