//! HTTP handlers for recipes and production runs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{auth::require_manager, CurrentUser};
use crate::services::production::{
    ProductionRun, ProductionRunInput, ProductionRunResponse, ProductionService, Recipe,
    RecipeInput, RecipeLine,
};
use crate::AppState;

/// Record a production run
pub async fn record_run(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProductionRunInput>,
) -> AppResult<Json<ProductionRunResponse>> {
    let service = ProductionService::new(state.db);
    let response = service.record_run(input, current_user.0.user_id).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    pub store_id: Option<Uuid>,
}

/// List recent production runs
pub async fn list_runs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListRunsQuery>,
) -> AppResult<Json<Vec<ProductionRun>>> {
    let service = ProductionService::new(state.db);
    let runs = service.list_runs(query.store_id).await?;
    Ok(Json(runs))
}

/// List active recipes with their current per-unit cost
pub async fn list_recipes(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = ProductionService::new(state.db);
    let recipes = service.list_recipes().await?;
    Ok(Json(recipes))
}

#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub lines: Vec<RecipeLine>,
}

/// Fetch one recipe with its ingredient lines
pub async fn get_recipe(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RecipeDetail>> {
    let service = ProductionService::new(state.db);
    let (recipe, lines) = service.get_recipe(id).await?;
    Ok(Json(RecipeDetail { recipe, lines }))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<Recipe>> {
    require_manager(&current_user.0)?;
    let service = ProductionService::new(state.db);
    let recipe = service.create_recipe(input).await?;
    Ok(Json(recipe))
}

/// Update a recipe and its lines
pub async fn update_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<Recipe>> {
    require_manager(&current_user.0)?;
    let service = ProductionService::new(state.db);
    let recipe = service.update_recipe(id, input).await?;
    Ok(Json(recipe))
}

/// Deactivate a recipe
pub async fn deactivate_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_manager(&current_user.0)?;
    let service = ProductionService::new(state.db);
    service.deactivate_recipe(id).await?;
    Ok(Json(()))
}
