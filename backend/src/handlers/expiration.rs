//! HTTP handlers for batch expiration tracking

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expiration::{
    ExpirationService, ExpiringBatch, WastageInput, WastageResponse,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub store_id: Option<Uuid>,
    pub horizon_days: Option<i64>,
}

/// Batches approaching or past expiry
pub async fn expiring_batches(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<ExpiringBatch>>> {
    let service = ExpirationService::new(state.db);
    let batches = service
        .expiring_batches(query.store_id, query.horizon_days)
        .await?;
    Ok(Json(batches))
}

/// Write off a batch's remaining quantity
pub async fn mark_wastage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WastageInput>,
) -> AppResult<Json<WastageResponse>> {
    let service = ExpirationService::new(state.db);
    let response = service.mark_wastage(input, current_user.0.user_id).await?;
    Ok(Json(response))
}
