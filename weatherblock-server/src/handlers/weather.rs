use crate::models::{ApiError, WeatherQuery, WeatherResponse, client_key_for};
use crate::state::AppState;
use axum::Json;
use axum::extract::{ConnectInfo, Query, State};
use std::net::SocketAddr;
use tracing::info;

/// GET /weather?city=<name>
pub async fn get_weather(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let city = query.city.unwrap_or_default();
    let client_key = client_key_for(&addr);

    info!(city = %city, "weather request");

    let snapshot = state.service.fetch_weather(&city, &client_key).await?;

    Ok(Json(WeatherResponse::new(snapshot)))
}
