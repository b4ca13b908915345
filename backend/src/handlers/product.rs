//! HTTP handlers for the product catalog and store inventory

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{auth::require_manager, CurrentUser};
use crate::services::product::{ProductFilter, ProductInput, ProductService, StoreStockItem};
use crate::AppState;
use shared::models::product::{Category, Product};
use shared::types::{PaginatedResponse, Pagination};

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub raw_materials_only: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List products with search and filters
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let service = ProductService::new(state.db);
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let filter = ProductFilter {
        search: query.search,
        category_id: query.category_id,
        is_active: query.is_active,
        raw_materials_only: query.raw_materials_only,
    };
    let products = service.list_products(filter, pagination).await?;
    Ok(Json(products))
}

/// Fetch one product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    require_manager(&current_user.0)?;
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    require_manager(&current_user.0)?;
    let service = ProductService::new(state.db);
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Deactivate a product, keeping its history
pub async fn deactivate_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_manager(&current_user.0)?;
    let service = ProductService::new(state.db);
    service.deactivate_product(id).await?;
    Ok(Json(()))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let service = ProductService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    require_manager(&current_user.0)?;
    let service = ProductService::new(state.db);
    let category = service.create_category(&input.name).await?;
    Ok(Json(category))
}

/// Stock position for every product in a store
pub async fn store_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StoreStockItem>>> {
    let service = ProductService::new(state.db);
    let stock = service.store_stock(store_id).await?;
    Ok(Json(stock))
}

/// Products at or below their reorder level in a store
pub async fn low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StoreStockItem>>> {
    let service = ProductService::new(state.db);
    let stock = service.low_stock(store_id).await?;
    Ok(Json(stock))
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub current_stock: Decimal,
}

/// Stocktake correction for one product in a store
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<()>> {
    require_manager(&current_user.0)?;
    let service = ProductService::new(state.db);
    service
        .adjust_stock(store_id, input.product_id, input.current_stock)
        .await?;
    Ok(Json(()))
}
