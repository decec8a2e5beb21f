use crate::{Config, WeatherError, WeatherSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Read side of a weather provider: current conditions for a city.
///
/// Implementations are transport only. Caching, rate limiting and retry
/// policy all live with the caller.
#[async_trait]
pub trait CurrentWeather: Send + Sync + Debug {
    /// Fetch current conditions for a normalized city name.
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the provider client from configuration.
///
/// Fails fast with [`WeatherError::MissingCredential`] when no API key is
/// configured; no network traffic happens here.
pub fn client_from_config(config: &Config) -> Result<OpenWeatherClient, WeatherError> {
    let api_key = config.api_key().ok_or(WeatherError::MissingCredential)?;

    OpenWeatherClient::new(
        api_key.to_owned(),
        config.api_base.clone(),
        config.icon_base.clone(),
    )
}
