//! Sales and profit reporting
//!
//! The service fetches flat rows for a date range and feeds them through
//! the pure reducers in `shared::reports`, so the numbers on the report
//! screens match what the reducers' unit tests pin down.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::product::stock_status;
use shared::reports::{
    count_customers, group_lines_by_product, group_sales_by_day, DailySales, ProductLineRow,
    ProductPerformance, SaleAmountRow,
};
use shared::types::{DateRange, StockStatus};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Headline figures for a date range
#[derive(Debug, Serialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub avg_order_value: Decimal,
    pub total_discount: Decimal,
    pub unique_customers: i64,
}

/// One day of the net profit report, from the `daily_net_profit` view
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyNetProfit {
    pub day: NaiveDate,
    pub store_id: Uuid,
    pub revenue: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub total_orders: i64,
    pub wastage_cost: Decimal,
    pub wastage_count: i64,
    pub net_profit: Decimal,
}

/// One product's stock valuation in the stock report
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockReportItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub weighted_avg_cost: Decimal,
    pub stock_value: Decimal,
    pub reorder_level: Decimal,
    #[sqlx(skip)]
    pub status: Option<StockStatus>,
}

/// One row of the dashboard's recent-sales list
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentSale {
    pub id: Uuid,
    pub bill_number: String,
    pub total_amount: Decimal,
    pub payment_mode: String,
    pub sale_date: chrono::DateTime<chrono::Utc>,
}

/// Today's dashboard numbers for one store
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub todays_sales: Decimal,
    pub todays_orders: i64,
    pub avg_bill_value: Decimal,
    pub todays_customers: i64,
    pub low_stock_count: i64,
    pub expiring_soon_count: i64,
    pub total_products: i64,
    pub recent_sales: Vec<RecentSale>,
    pub top_products: Vec<ProductPerformance>,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_name: Option<String>,
    customer_phone: Option<String>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Daily totals for the range, one row per calendar day with sales
    pub async fn daily_sales(
        &self,
        store_id: Option<Uuid>,
        range: &DateRange,
    ) -> AppResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, (NaiveDate, Decimal)>(
            r#"
            SELECT sale_date::date, total_amount
            FROM sales
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND sale_date::date BETWEEN $2 AND $3
            "#,
        )
        .bind(store_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let rows: Vec<SaleAmountRow> = rows
            .into_iter()
            .map(|(sale_date, total_amount)| SaleAmountRow {
                sale_date,
                total_amount,
            })
            .collect();

        Ok(group_sales_by_day(&rows))
    }

    /// Per-product revenue, cost, and profit for the range, best sellers
    /// first. Cost uses the per-line cost snapshot taken at sale time.
    pub async fn product_performance(
        &self,
        store_id: Option<Uuid>,
        range: &DateRange,
    ) -> AppResult<Vec<ProductPerformance>> {
        let rows = sqlx::query_as::<_, (String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT sl.product_name, sl.quantity, sl.line_total, sl.cost_price
            FROM sales_lines sl
            JOIN sales s ON s.id = sl.sale_id
            WHERE ($1::uuid IS NULL OR s.store_id = $1)
              AND s.sale_date::date BETWEEN $2 AND $3
            "#,
        )
        .bind(store_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let rows: Vec<ProductLineRow> = rows
            .into_iter()
            .map(|(product_name, quantity, line_total, cost_price)| ProductLineRow {
                product_name,
                quantity,
                line_total,
                cost_price,
            })
            .collect();

        Ok(group_lines_by_product(&rows))
    }

    /// Headline figures for the range
    pub async fn sales_summary(
        &self,
        store_id: Option<Uuid>,
        range: &DateRange,
    ) -> AppResult<SalesSummary> {
        let (total_sales, total_orders, total_discount) =
            sqlx::query_as::<_, (Option<Decimal>, i64, Option<Decimal>)>(
                r#"
                SELECT SUM(total_amount), COUNT(*), SUM(discount_amount)
                FROM sales
                WHERE ($1::uuid IS NULL OR store_id = $1)
                  AND sale_date::date BETWEEN $2 AND $3
                "#,
            )
            .bind(store_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_one(&self.db)
            .await?;

        let unique_customers = self.unique_customers(store_id, range).await?;

        let total_sales = total_sales.unwrap_or(Decimal::ZERO);
        let avg_order_value = if total_orders > 0 {
            total_sales / Decimal::from(total_orders)
        } else {
            Decimal::ZERO
        };

        Ok(SalesSummary {
            total_sales,
            total_orders,
            avg_order_value,
            total_discount: total_discount.unwrap_or(Decimal::ZERO),
            unique_customers,
        })
    }

    /// Net profit per day and store from the `daily_net_profit` view
    pub async fn net_profit(
        &self,
        store_id: Option<Uuid>,
        range: &DateRange,
    ) -> AppResult<Vec<DailyNetProfit>> {
        let rows = sqlx::query_as::<_, DailyNetProfit>(
            r#"
            SELECT day, store_id, revenue, cost_of_goods, gross_profit,
                   total_orders, wastage_cost, wastage_count, net_profit
            FROM daily_net_profit
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND day BETWEEN $2 AND $3
            ORDER BY day
            "#,
        )
        .bind(store_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Current stock valuation for every active product, chain-wide or
    /// for one store
    pub async fn stock_report(&self, store_id: Option<Uuid>) -> AppResult<Vec<StockReportItem>> {
        let mut items = sqlx::query_as::<_, StockReportItem>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.unit,
                   COALESCE(si.current_stock, p.current_stock) AS current_stock,
                   p.weighted_avg_cost,
                   COALESCE(si.current_stock, p.current_stock) * p.weighted_avg_cost AS stock_value,
                   COALESCE(si.reorder_level, p.reorder_level) AS reorder_level
            FROM products p
            LEFT JOIN store_inventory si
              ON si.product_id = p.id AND si.store_id = $1
            WHERE p.is_active = true
              AND ($1::uuid IS NULL OR si.store_id IS NOT NULL)
            ORDER BY p.name
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        for item in &mut items {
            item.status = Some(stock_status(item.current_stock, item.reorder_level));
        }

        Ok(items)
    }

    /// Today's headline numbers for the store dashboard
    pub async fn dashboard(&self, store_id: Uuid) -> AppResult<DashboardSummary> {
        let (todays_sales, todays_orders) =
            sqlx::query_as::<_, (Option<Decimal>, i64)>(
                r#"
                SELECT SUM(total_amount), COUNT(*)
                FROM sales
                WHERE store_id = $1 AND sale_date::date = CURRENT_DATE
                "#,
            )
            .bind(store_id)
            .fetch_one(&self.db)
            .await?;

        let today = chrono::Utc::now().date_naive();
        let todays_customers = self
            .unique_customers(
                Some(store_id),
                &DateRange {
                    start: today,
                    end: today,
                },
            )
            .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            WHERE si.store_id = $1 AND p.is_active = true
              AND si.current_stock <= si.reorder_level
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        let expiring_soon_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM expiring_finished_goods
            WHERE store_id = $1 AND days_until_expiry <= 3
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = true")
                .fetch_one(&self.db)
                .await?;

        let recent_sales = sqlx::query_as::<_, RecentSale>(
            r#"
            SELECT id, bill_number, total_amount, payment_mode, sale_date
            FROM sales
            WHERE store_id = $1
            ORDER BY sale_date DESC
            LIMIT 5
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        let top_products = self.top_products(store_id).await?;

        let todays_sales = todays_sales.unwrap_or(Decimal::ZERO);
        let avg_bill_value = if todays_orders > 0 {
            todays_sales / Decimal::from(todays_orders)
        } else {
            Decimal::ZERO
        };

        Ok(DashboardSummary {
            todays_sales,
            todays_orders,
            avg_bill_value,
            todays_customers,
            low_stock_count,
            expiring_soon_count,
            total_products,
            recent_sales,
            top_products,
        })
    }

    /// Top sellers by revenue over the trailing seven days
    async fn top_products(&self, store_id: Uuid) -> AppResult<Vec<ProductPerformance>> {
        let rows = sqlx::query_as::<_, (String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT sl.product_name, sl.quantity, sl.line_total, sl.cost_price
            FROM sales_lines sl
            JOIN sales s ON s.id = sl.sale_id
            WHERE s.store_id = $1
              AND s.sale_date >= NOW() - INTERVAL '7 days'
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        let rows: Vec<ProductLineRow> = rows
            .into_iter()
            .map(|(product_name, quantity, line_total, cost_price)| ProductLineRow {
                product_name,
                quantity,
                line_total,
                cost_price,
            })
            .collect();

        // The reducer sorts by revenue descending already
        let mut top = group_lines_by_product(&rows);
        top.truncate(5);
        Ok(top)
    }

    /// Distinct customers for a range: phone-or-name identities are
    /// deduplicated, each walk-in counts separately
    async fn unique_customers(
        &self,
        store_id: Option<Uuid>,
        range: &DateRange,
    ) -> AppResult<i64> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT customer_name, customer_phone
            FROM sales
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND sale_date::date BETWEEN $2 AND $3
            "#,
        )
        .bind(store_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let count = count_customers(
            rows.iter()
                .map(|r| (r.customer_name.as_deref(), r.customer_phone.as_deref())),
        );

        Ok(count as i64)
    }
}
