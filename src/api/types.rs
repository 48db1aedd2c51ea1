use serde::Serialize;

use crate::services::CacheStatus;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Body of a failed request. `error` is a stable machine-readable code.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// List payload shape the frontend expects: `{"results": [...]}`.
#[derive(Debug, Serialize)]
pub struct ResultsResponse<'a, T> {
    pub results: &'a [T],
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub username: String,
    pub photos_per_page: u32,
    pub cache: CacheStatus,
    pub gate: GateStatus,
}

#[derive(Debug, Serialize)]
pub struct GateStatus {
    pub enabled: bool,
    pub min_interval_ms: u64,
}
