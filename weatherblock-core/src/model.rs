use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized result of a successful weather fetch.
///
/// Only the provider client constructs this, and only once every field is
/// known; a response that cannot fill every field is reported as an error
/// instead of a partial snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// City name as resolved by the provider; casing and spelling may
    /// differ from the query.
    pub city: String,
    pub temperature_f: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mph: f64,
    pub icon_code: String,
    pub icon_url: String,
    /// Provider-reported observation time.
    pub observed_at: DateTime<Utc>,
}

/// Trim and case-fold a requested city into its canonical lookup form.
///
/// The cache key and the provider query string both use this form, so
/// "London", " london " and "LONDON" share one cache entry.
pub fn normalize_city(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Icon image URL for a provider icon code, e.g. "10d".
pub fn icon_url(icon_base: &str, icon_code: &str) -> String {
    format!("{}/img/wn/{}@2x.png", icon_base.trim_end_matches('/'), icon_code)
}
