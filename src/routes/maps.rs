use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    pub api_key: String,
}

/// GET /api/maps/config — the browser key for the address picker.
pub async fn maps_config(State(state): State<AppState>) -> Result<Json<MapsConfig>, ApiError> {
    state
        .settings
        .maps_api_key
        .clone()
        .map(|api_key| Json(MapsConfig { api_key }))
        .ok_or_else(|| {
            ApiError::Unavailable(
                "Maps are not configured. Set MAPS_API_KEY and restart the server".to_string(),
            )
        })
}
