//! HTTP handlers for the POS checkout endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{
    CheckoutInput, CheckoutResponse, SaleFilter, SaleService,
};
use crate::AppState;
use shared::models::sale::{Sale, SaleLine};
use shared::types::Pagination;

/// Complete a sale
pub async fn checkout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CheckoutInput>,
) -> AppResult<Json<CheckoutResponse>> {
    let service = SaleService::new(state.db, state.config.checkout.clone());
    let response = service.checkout(input, current_user.0.user_id).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub store_id: Option<Uuid>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub payment_mode: Option<shared::types::PaymentMode>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List sales, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListSalesQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db, state.config.checkout.clone());
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let filter = SaleFilter {
        store_id: query.store_id,
        start_date: query.start_date,
        end_date: query.end_date,
        payment_mode: query.payment_mode,
    };
    let sales = service.list_sales(filter, pagination).await?;
    Ok(Json(sales))
}

#[derive(Debug, serde::Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// Fetch one sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleDetail>> {
    let service = SaleService::new(state.db, state.config.checkout.clone());
    let (sale, lines) = service.get_sale(sale_id).await?;
    Ok(Json(SaleDetail { sale, lines }))
}
