//! HTTP handlers for user administration

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{auth::require_admin, CurrentUser};
use crate::services::user::{CreateUserInput, UpdateUserInput, UserService};
use crate::AppState;
use shared::models::user::Profile;

/// List all user accounts
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Profile>>> {
    require_admin(&current_user.0)?;
    let service = UserService::new(state.db);
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Create a user account with store assignments
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<Profile>> {
    require_admin(&current_user.0)?;
    let service = UserService::new(state.db);
    let user = service.create_user(input).await?;
    Ok(Json(user))
}

/// Update a user's name, role, or active flag
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<Profile>> {
    require_admin(&current_user.0)?;
    let service = UserService::new(state.db);
    let user = service.update_user(id, input).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct StoreAssignmentsInput {
    pub store_ids: Vec<Uuid>,
}

/// Replace a user's store assignments
pub async fn set_store_assignments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StoreAssignmentsInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = UserService::new(state.db);
    service.set_store_assignments(id, &input.store_ids).await?;
    Ok(Json(()))
}

#[derive(Debug, Deserialize)]
pub struct DefaultStoreInput {
    pub store_id: Uuid,
}

/// Set a user's default store
pub async fn set_default_store(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<DefaultStoreInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;
    let service = UserService::new(state.db);
    service.set_default_store(id, input.store_id).await?;
    Ok(Json(()))
}
