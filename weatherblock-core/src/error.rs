use thiserror::Error;

/// Classified failures of a single weather fetch.
///
/// Every variant is terminal for the current call; no retry happens inside
/// the service, and none of these may surface as a crash or a partially
/// rendered snapshot.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No provider API key is configured. Fails fast, before any network
    /// traffic.
    #[error("no weather API key configured")]
    MissingCredential,

    /// The requested city was empty or unusable after normalization.
    #[error("invalid city: {0}")]
    InvalidInput(String),

    /// The caller exhausted its request window.
    #[error("rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Network, DNS or timeout failure reaching the provider.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status from the provider.
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// 2xx response whose body lacks required fields.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// Stable machine-readable code, used in API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            WeatherError::MissingCredential => "missing_credential",
            WeatherError::InvalidInput(_) => "invalid_input",
            WeatherError::RateLimited { .. } => "rate_limited",
            WeatherError::Transport(_) => "transport_error",
            WeatherError::Provider { .. } => "provider_error",
            WeatherError::MalformedResponse(_) => "malformed_response",
        }
    }
}
