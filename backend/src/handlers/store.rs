//! HTTP handlers for store management

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{auth::require_admin, CurrentUser};
use crate::services::store::{StoreInput, StoreService};
use crate::AppState;
use shared::models::store::Store;

/// Stores visible to the current user
pub async fn list_stores(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Store>>> {
    let service = StoreService::new(state.db);
    let stores = service.list_stores_for(&current_user.0).await?;
    Ok(Json(stores))
}

/// Fetch one store
pub async fn get_store(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    let service = StoreService::new(state.db);
    let store = service.get_store(id).await?;
    Ok(Json(store))
}

/// Create a store
pub async fn create_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StoreInput>,
) -> AppResult<Json<Store>> {
    require_admin(&current_user.0)?;
    let service = StoreService::new(state.db);
    let store = service.create_store(input).await?;
    Ok(Json(store))
}

/// Update a store
pub async fn update_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StoreInput>,
) -> AppResult<Json<Store>> {
    require_admin(&current_user.0)?;
    let service = StoreService::new(state.db);
    let store = service.update_store(id, input).await?;
    Ok(Json(store))
}

/// Deactivate a store
pub async fn deactivate_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = StoreService::new(state.db);
    service.deactivate_store(id).await?;
    Ok(Json(()))
}
