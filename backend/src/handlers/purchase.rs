//! HTTP handlers for purchasing

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{auth::require_manager, CurrentUser};
use crate::services::purchase::{
    Purchase, PurchaseFilter, PurchaseInput, PurchaseLine, PurchaseService, Supplier,
    SupplierInput,
};
use crate::AppState;
use shared::types::Pagination;

/// Record a purchase
pub async fn create_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<PurchaseInput>,
) -> AppResult<Json<Purchase>> {
    let service = PurchaseService::new(state.db);
    let purchase = service
        .create_purchase(input, current_user.0.user_id)
        .await?;
    Ok(Json(purchase))
}

#[derive(Debug, serde::Deserialize)]
pub struct ListPurchasesQuery {
    pub store_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List purchases, newest first
pub async fn list_purchases(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListPurchasesQuery>,
) -> AppResult<Json<Vec<Purchase>>> {
    let service = PurchaseService::new(state.db);
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let filter = PurchaseFilter {
        store_id: query.store_id,
        supplier_id: query.supplier_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let purchases = service.list_purchases(filter, pagination).await?;
    Ok(Json(purchases))
}

#[derive(Debug, Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
}

/// Fetch one purchase with its lines
pub async fn get_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db);
    let (purchase, lines) = service.get_purchase(id).await?;
    Ok(Json(PurchaseDetail { purchase, lines }))
}

/// List active suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = PurchaseService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    require_manager(&current_user.0)?;
    let service = PurchaseService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok(Json(supplier))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    require_manager(&current_user.0)?;
    let service = PurchaseService::new(state.db);
    let supplier = service.update_supplier(id, input).await?;
    Ok(Json(supplier))
}
