use crate::dtos::HealthResponse;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};

/// Sentinel device string reported while no model is loaded.
const NOT_LOADED: &str = "not loaded";

/// Liveness probe; always 200.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let device = match state.session.loaded() {
        Some(loaded) => loaded.model.device(),
        None => NOT_LOADED.to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.session.is_loaded(),
        device,
    })
}
