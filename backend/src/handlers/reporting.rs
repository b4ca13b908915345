//! HTTP handlers for reports and CSV export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::export;
use crate::services::reporting::{
    DailyNetProfit, DashboardSummary, ReportingService, SalesSummary, StockReportItem,
};
use crate::AppState;
use shared::reports::{DailySales, ProductPerformance};
use shared::types::DateRange;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub store_id: Option<Uuid>,
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
}

impl ReportQuery {
    /// Explicit dates win; a missing range falls back to the last 30
    /// days ending today
    fn range(&self) -> AppResult<DateRange> {
        let end = self.end.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let start = self
            .start
            .unwrap_or_else(|| DateRange::last_days(end, 30).start);
        if start > end {
            return Err(AppError::validation("start", "Start date is after end date"));
        }
        Ok(DateRange { start, end })
    }
}

/// Daily sales totals for a date range
pub async fn daily_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<DailySales>>> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.daily_sales(query.store_id, &range).await?;
    Ok(Json(report))
}

/// Per-product revenue and profit for a date range
pub async fn product_performance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<ProductPerformance>>> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.product_performance(query.store_id, &range).await?;
    Ok(Json(report))
}

/// Headline figures for a date range
pub async fn sales_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesSummary>> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let summary = service.sales_summary(query.store_id, &range).await?;
    Ok(Json(summary))
}

/// Daily net profit including wastage
pub async fn net_profit(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<DailyNetProfit>>> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.net_profit(query.store_id, &range).await?;
    Ok(Json(report))
}

/// Stock valuation for active products, chain-wide or for one store
pub async fn stock_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<StockReportItem>>> {
    let service = ReportingService::new(state.db);
    let report = service.stock_report(query.store_id).await?;
    Ok(Json(report))
}

/// Today's dashboard numbers for one store
pub async fn dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<DashboardSummary>> {
    let service = ReportingService::new(state.db);
    let summary = service.dashboard(store_id).await?;
    Ok(Json(summary))
}

/// Download the daily sales report as CSV
pub async fn export_daily_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.daily_sales(query.store_id, &range).await?;
    let csv = export::daily_sales_csv(&report)?;
    Ok(csv_download("daily-sales.csv", csv))
}

/// Download the product performance report as CSV
pub async fn export_product_performance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.product_performance(query.store_id, &range).await?;
    let csv = export::product_performance_csv(&report)?;
    Ok(csv_download("product-performance.csv", csv))
}

/// Download the summary figures as CSV
pub async fn export_sales_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let summary = service.sales_summary(query.store_id, &range).await?;
    let csv = export::sales_summary_csv(&summary)?;
    Ok(csv_download("sales-summary.csv", csv))
}

/// Download the daily net profit report as CSV
pub async fn export_net_profit(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.range()?;
    let service = ReportingService::new(state.db);
    let report = service.net_profit(query.store_id, &range).await?;
    let csv = export::net_profit_csv(&report)?;
    Ok(csv_download("net-profit.csv", csv))
}

/// Download the stock valuation report as CSV
pub async fn export_stock_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.db);
    let report = service.stock_report(query.store_id).await?;
    let csv = export::stock_report_csv(&report)?;
    Ok(csv_download("stock-report.csv", csv))
}

fn csv_download(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}
