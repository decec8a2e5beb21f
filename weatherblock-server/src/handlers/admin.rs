use crate::models::{ApiError, CredentialRequest};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{info, warn};

/// PUT /admin/credential
pub async fn set_credential(
    State(state): State<AppState>,
    Json(req): Json<CredentialRequest>,
) -> Result<StatusCode, ApiError> {
    let api_key = req.api_key.trim().to_owned();
    if api_key.is_empty() {
        return Err(ApiError::bad_request("api_key must not be empty"));
    }

    let mut config = state.config.lock().await;
    config.set_api_key(api_key);

    if let Err(err) = config.save() {
        warn!(error = %err, "failed to persist configuration");
    }

    state.service.set_credential(&config).await?;
    info!("provider credential updated");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /admin/credential
pub async fn clear_credential(
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut config = state.config.lock().await;
    config.clear_api_key();

    if let Err(err) = config.save() {
        warn!(error = %err, "failed to persist configuration");
    }

    state.service.set_credential(&config).await?;
    info!("provider credential cleared");

    Ok(StatusCode::NO_CONTENT)
}
