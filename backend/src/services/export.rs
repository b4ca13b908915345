//! CSV export for report downloads
//!
//! Exports go through the `csv` crate so fields containing commas,
//! quotes, or newlines come out properly quoted.

use crate::error::{AppError, AppResult};
use crate::services::reporting::{DailyNetProfit, SalesSummary, StockReportItem};
use shared::reports::{DailySales, ProductPerformance};

/// Render the daily sales report as CSV
pub fn daily_sales_csv(rows: &[DailySales]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["date", "total_sales", "total_orders", "avg_order_value"])
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.date.to_string(),
                row.total_sales.to_string(),
                row.total_orders.to_string(),
                row.avg_order_value.to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render the product performance report as CSV
pub fn product_performance_csv(rows: &[ProductPerformance]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["product", "quantity_sold", "revenue", "cost", "profit"])
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.product_name.clone(),
                row.quantity_sold.to_string(),
                row.revenue.to_string(),
                row.cost.to_string(),
                row.profit.to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render the daily net profit report as CSV
pub fn net_profit_csv(rows: &[DailyNetProfit]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "day",
            "store_id",
            "revenue",
            "cost_of_goods",
            "gross_profit",
            "total_orders",
            "wastage_cost",
            "wastage_count",
            "net_profit",
        ])
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.day.to_string(),
                row.store_id.to_string(),
                row.revenue.to_string(),
                row.cost_of_goods.to_string(),
                row.gross_profit.to_string(),
                row.total_orders.to_string(),
                row.wastage_cost.to_string(),
                row.wastage_count.to_string(),
                row.net_profit.to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render the stock valuation report as CSV
pub fn stock_report_csv(rows: &[StockReportItem]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "product",
            "unit",
            "current_stock",
            "weighted_avg_cost",
            "stock_value",
            "reorder_level",
            "status",
        ])
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.product_name.clone(),
                row.unit.clone(),
                row.current_stock.to_string(),
                row.weighted_avg_cost.to_string(),
                row.stock_value.to_string(),
                row.reorder_level.to_string(),
                row.status.map(|s| s.as_str()).unwrap_or("").to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render the summary figures as a single-row CSV
pub fn sales_summary_csv(summary: &SalesSummary) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "total_sales",
            "total_orders",
            "avg_order_value",
            "total_discount",
            "unique_customers",
        ])
        .map_err(csv_error)?;

    writer
        .write_record([
            summary.total_sales.to_string(),
            summary.total_orders.to_string(),
            summary.avg_order_value.to_string(),
            summary.total_discount.to_string(),
            summary.unique_customers.to_string(),
        ])
        .map_err(csv_error)?;

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV was not UTF-8: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV write failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn product_names_with_commas_are_quoted() {
        let rows = vec![ProductPerformance {
            product_name: "Bun, Cream".to_string(),
            quantity_sold: Decimal::from(3),
            revenue: Decimal::from_str("120.00").unwrap(),
            cost: Decimal::from_str("45.00").unwrap(),
            profit: Decimal::from_str("75.00").unwrap(),
        }];

        let csv = product_performance_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("product,quantity_sold,revenue,cost,profit")
        );
        assert_eq!(lines.next(), Some("\"Bun, Cream\",3,120.00,45.00,75.00"));
    }

    #[test]
    fn daily_csv_has_one_row_per_day() {
        let rows = vec![DailySales {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            total_sales: Decimal::from(500),
            total_orders: 10,
            avg_order_value: Decimal::from(50),
        }];

        let csv = daily_sales_csv(&rows).unwrap();
        assert!(csv.contains("2024-03-07,500,10,50"));
    }
}
