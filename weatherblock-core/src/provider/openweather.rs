use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::WeatherError;
use crate::model::{WeatherSnapshot, icon_url};

use super::CurrentWeather;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeatherMap current-weather client.
///
/// Requests imperial units explicitly; the provider default depends on the
/// endpoint and must not be relied upon.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    api_base: String,
    icon_base: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, api_base: String, icon_base: String) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { api_key, api_base, icon_base, http })
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.api_base.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "imperial"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        snapshot_from_response(parsed, &self.icon_base)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn snapshot_from_response(
    parsed: OwCurrentResponse,
    icon_base: &str,
) -> Result<WeatherSnapshot, WeatherError> {
    let city = match parsed.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(WeatherError::MalformedResponse(
                "response has no resolved city name".to_string(),
            ));
        }
    };

    let conditions = parsed.weather.first().ok_or_else(|| {
        WeatherError::MalformedResponse("response has no weather conditions".to_string())
    })?;

    let observed_at = parsed
        .dt
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(WeatherSnapshot {
        city,
        temperature_f: parsed.main.temp,
        description: conditions.description.clone(),
        humidity_pct: parsed.main.humidity,
        wind_speed_mph: parsed.wind.speed,
        icon_code: conditions.icon.clone(),
        icon_url: icon_url(icon_base, &conditions.icon),
        observed_at,
    })
}

#[async_trait]
impl CurrentWeather for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let truncated: String = body.chars().take(MAX).collect();
        format!("{truncated}...")
    } else {
        body.to_string()
    }
}
