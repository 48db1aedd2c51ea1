//! Photo and collection endpoints.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, ResultsResponse};
use crate::services::Page;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

fn resolve_page(query: Result<Query<PageQuery>, QueryRejection>) -> Result<u32, ApiError> {
    let Query(query) = query
        .map_err(|_| ApiError::validation("Invalid page. Page must be a positive integer"))?;

    match query.page {
        None => Ok(1),
        Some(0) => Err(ApiError::validation(
            "Invalid page: 0. Page must be a positive integer",
        )),
        Some(page) => Ok(page),
    }
}

/// `GET /api/photos?page=<n>`
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = resolve_page(query)?;
    let photos = state.photo_service().photos(page).await?;
    Ok(results_response(&photos))
}

/// `GET /api/collections?page=<n>`
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let page = resolve_page(query)?;
    let collections = state.photo_service().collections(page).await?;
    Ok(results_response(&collections))
}

/// Serializes the page and tags the response with its cache outcome for the
/// request log.
fn results_response<T: serde::Serialize>(page: &Page<T>) -> Response {
    let mut response = Json(ResultsResponse {
        results: page.items.as_slice(),
    })
    .into_response();
    response.extensions_mut().insert(page.cache);
    response
}
