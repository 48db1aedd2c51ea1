use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiResponse, AppState, GateStatus, SystemStatus};

/// `GET /`
pub async fn root() -> &'static str {
    "Unsplash proxy server is running..."
}

/// `GET /api/system/status`
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SystemStatus>> {
    let config = state.config();
    let gate = state.gate();

    Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        username: config.upstream.username.clone(),
        photos_per_page: state.photo_service().photos_per_page(),
        cache: state.photo_service().cache_status().await,
        gate: GateStatus {
            enabled: gate.is_enabled(),
            min_interval_ms: u64::try_from(gate.min_interval().as_millis()).unwrap_or(u64::MAX),
        },
    }))
}
