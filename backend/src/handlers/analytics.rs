//! HTTP handlers for multi-store analytics

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{auth::require_manager, CurrentUser};
use crate::services::analytics::{
    AnalyticsService, DayOfWeekPattern, ReorderRecommendation, StoreMetrics,
};
use crate::AppState;
use shared::reports::TrendPoint;
use shared::types::DateRange;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl RangeQuery {
    fn range(&self) -> AppResult<DateRange> {
        if self.start > self.end {
            return Err(AppError::validation("start", "Start date is after end date"));
        }
        Ok(DateRange {
            start: self.start,
            end: self.end,
        })
    }
}

/// Compare stores over a date range
pub async fn store_comparison(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<StoreMetrics>>> {
    require_manager(&current_user.0)?;
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    let metrics = service.store_comparison(&range).await?;
    Ok(Json(metrics))
}

/// Per-store sales trend pivoted by date
pub async fn sales_trend(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<TrendPoint>>> {
    require_manager(&current_user.0)?;
    let range = query.range()?;
    let service = AnalyticsService::new(state.db);
    let trend = service.sales_trend(&range).await?;
    Ok(Json(trend))
}

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store_id: Option<Uuid>,
}

/// Reorder recommendations
pub async fn reorder_recommendations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StoreQuery>,
) -> AppResult<Json<Vec<ReorderRecommendation>>> {
    require_manager(&current_user.0)?;
    let service = AnalyticsService::new(state.db);
    let recommendations = service.reorder_recommendations(query.store_id).await?;
    Ok(Json(recommendations))
}

/// Average sales by weekday
pub async fn day_of_week_pattern(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StoreQuery>,
) -> AppResult<Json<Vec<DayOfWeekPattern>>> {
    require_manager(&current_user.0)?;
    let service = AnalyticsService::new(state.db);
    let pattern = service.day_of_week_pattern(query.store_id).await?;
    Ok(Json(pattern))
}
