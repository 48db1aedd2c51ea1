use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Rejects every request that arrives too soon after the last admitted one.
/// Runs before any handler, so a rejection never reaches the cache or upstream.
pub async fn gate_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let gate = state.gate();

    if let Err(wait) = gate.admit() {
        metrics::counter!("gate_rejections_total").increment(1);
        let retry_after_secs = wait.as_millis().div_ceil(1000).max(1);
        return Err(ApiError::GateRejected {
            retry_after_secs: u64::try_from(retry_after_secs).unwrap_or(u64::MAX),
        });
    }

    Ok(next.run(request).await)
}
