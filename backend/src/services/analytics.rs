//! Multi-store analytics
//!
//! Cross-store comparisons for admins and managers. Every metric comes
//! from one grouped query over all stores, never a per-store loop.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::reports::{pivot_sales_trend, StoreDayRow, TrendPoint};
use shared::types::DateRange;

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// One store's figures in the cross-store comparison
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StoreMetrics {
    pub store_id: Uuid,
    pub store_name: String,
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub avg_order_value: Decimal,
    pub gross_profit: Decimal,
    pub product_count: i64,
    pub low_stock_count: i64,
}

/// One row of the reorder recommendation list
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReorderRecommendation {
    pub store_id: Uuid,
    pub store_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub current_stock: Decimal,
    pub reorder_level: Decimal,
    pub avg_daily_usage: Decimal,
    pub suggested_order_quantity: Decimal,
}

/// Average sales per weekday, Monday first
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DayOfWeekPattern {
    pub store_id: Uuid,
    pub store_name: String,
    pub day_of_week: i32,
    pub avg_sales: Decimal,
    pub avg_orders: Decimal,
}

impl AnalyticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compare every active store over the range
    pub async fn store_comparison(&self, range: &DateRange) -> AppResult<Vec<StoreMetrics>> {
        let metrics = sqlx::query_as::<_, StoreMetrics>(
            r#"
            SELECT st.id AS store_id,
                   st.name AS store_name,
                   COALESCE(SUM(s.total_amount), 0) AS total_sales,
                   COUNT(s.id) AS total_orders,
                   COALESCE(SUM(s.total_amount) / NULLIF(COUNT(s.id), 0), 0) AS avg_order_value,
                   COALESCE(SUM(p.profit), 0) AS gross_profit,
                   (SELECT COUNT(*)
                    FROM store_inventory si
                    JOIN products pr ON pr.id = si.product_id
                    WHERE si.store_id = st.id AND pr.is_active = true) AS product_count,
                   (SELECT COUNT(*)
                    FROM store_inventory si
                    JOIN products pr ON pr.id = si.product_id
                    WHERE si.store_id = st.id AND pr.is_active = true
                      AND si.current_stock <= si.reorder_level) AS low_stock_count
            FROM stores st
            LEFT JOIN sales s
              ON s.store_id = st.id AND s.sale_date::date BETWEEN $1 AND $2
            LEFT JOIN LATERAL (
                SELECT SUM(sl.line_total - sl.cost_price * sl.quantity) AS profit
                FROM sales_lines sl
                WHERE sl.sale_id = s.id
            ) p ON true
            WHERE st.is_active = true
            GROUP BY st.id, st.name
            ORDER BY total_sales DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(metrics)
    }

    /// Per-store daily totals pivoted into one point per date
    pub async fn sales_trend(&self, range: &DateRange) -> AppResult<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, (String, NaiveDate, Decimal)>(
            r#"
            SELECT store_name, day, total_sales
            FROM sales_trend_analysis
            WHERE day BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let rows: Vec<StoreDayRow> = rows
            .into_iter()
            .map(|(store_name, date, total_sales)| StoreDayRow {
                store_name,
                date,
                total_sales,
            })
            .collect();

        Ok(pivot_sales_trend(&rows))
    }

    /// Products to reorder, from the `reorder_recommendations` view
    pub async fn reorder_recommendations(
        &self,
        store_id: Option<Uuid>,
    ) -> AppResult<Vec<ReorderRecommendation>> {
        let recommendations = sqlx::query_as::<_, ReorderRecommendation>(
            r#"
            SELECT store_id, store_name, product_id, product_name,
                   current_stock, reorder_level, avg_daily_usage,
                   suggested_order_quantity
            FROM reorder_recommendations
            WHERE ($1::uuid IS NULL OR store_id = $1)
            ORDER BY store_name, product_name
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        Ok(recommendations)
    }

    /// Average sales by weekday, from the `day_of_week_pattern` view
    pub async fn day_of_week_pattern(
        &self,
        store_id: Option<Uuid>,
    ) -> AppResult<Vec<DayOfWeekPattern>> {
        let pattern = sqlx::query_as::<_, DayOfWeekPattern>(
            r#"
            SELECT store_id, store_name, day_of_week, avg_sales, avg_orders
            FROM day_of_week_pattern
            WHERE ($1::uuid IS NULL OR store_id = $1)
            ORDER BY store_name, day_of_week
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        Ok(pattern)
    }
}
