use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, put},
};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Weather fetch
        .route("/weather", get(handlers::get_weather))
        // Credential administration
        .route("/admin/credential", put(handlers::set_credential))
        .route("/admin/credential", delete(handlers::clear_credential))
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
