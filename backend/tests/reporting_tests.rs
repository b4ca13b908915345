//! Reporting tests
//!
//! Exercise the pure reducers behind the report endpoints and the CSV
//! export, including quoting of awkward product names.

use rust_decimal::Decimal;
use std::str::FromStr;

use bakepos_backend::services::export;
use bakepos_backend::services::reporting::StockReportItem;
use shared::models::product::{is_low_stock, stock_status};
use shared::reports::{
    count_customers, group_lines_by_product, group_sales_by_day, pivot_sales_trend,
    ProductLineRow, SaleAmountRow, StoreDayRow,
};
use shared::types::{DateRange, StockStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::from_str(s).unwrap()
}

// ============================================================================
// Daily grouping
// ============================================================================

#[test]
fn daily_report_averages_per_day() {
    let rows = vec![
        SaleAmountRow { sale_date: day("2024-03-07"), total_amount: dec("100") },
        SaleAmountRow { sale_date: day("2024-03-07"), total_amount: dec("50") },
        SaleAmountRow { sale_date: day("2024-03-08"), total_amount: dec("80") },
    ];

    let report = group_sales_by_day(&rows);
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].total_sales, dec("150"));
    assert_eq!(report[0].avg_order_value, dec("75"));
    assert_eq!(report[1].total_orders, 1);
}

#[test]
fn daily_report_skips_days_without_sales() {
    let rows = vec![
        SaleAmountRow { sale_date: day("2024-03-01"), total_amount: dec("10") },
        SaleAmountRow { sale_date: day("2024-03-15"), total_amount: dec("20") },
    ];

    // Only days with at least one sale appear
    let report = group_sales_by_day(&rows);
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].date, day("2024-03-01"));
    assert_eq!(report[1].date, day("2024-03-15"));
}

// ============================================================================
// Product profit
// ============================================================================

#[test]
fn product_profit_uses_cost_snapshots() {
    let rows = vec![
        ProductLineRow {
            product_name: "Masala Chai".into(),
            quantity: dec("10"),
            line_total: dec("250"),
            cost_price: dec("8"),
        },
        // Same product sold later after a cost change; each line keeps
        // its own snapshot
        ProductLineRow {
            product_name: "Masala Chai".into(),
            quantity: dec("10"),
            line_total: dec("250"),
            cost_price: dec("12"),
        },
    ];

    let report = group_lines_by_product(&rows);
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].revenue, dec("500"));
    assert_eq!(report[0].cost, dec("200")); // 10*8 + 10*12
    assert_eq!(report[0].profit, dec("300"));
}

// ============================================================================
// Customer counting
// ============================================================================

#[test]
fn phone_identifies_customers_across_name_variants() {
    let sales = vec![
        (Some("A. Sharma"), Some("9876500000")),
        (Some("Asha Sharma"), Some("9876500000")),
    ];
    // Same phone, spelled differently: one customer
    assert_eq!(count_customers(sales), 1);
}

#[test]
fn every_walk_in_counts_separately() {
    let sales: Vec<(Option<&str>, Option<&str>)> = vec![(None, None); 5];
    assert_eq!(count_customers(sales), 5);
}

// ============================================================================
// Trend pivot
// ============================================================================

#[test]
fn trend_pivot_is_one_point_per_date() {
    let rows = vec![
        StoreDayRow { store_name: "MG Road".into(), date: day("2024-03-07"), total_sales: dec("100") },
        StoreDayRow { store_name: "Koramangala".into(), date: day("2024-03-07"), total_sales: dec("200") },
        StoreDayRow { store_name: "MG Road".into(), date: day("2024-03-08"), total_sales: dec("150") },
    ];

    let trend = pivot_sales_trend(&rows);
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].by_store.len(), 2);
    assert_eq!(trend[0].by_store["MG Road"], dec("100"));
    assert_eq!(trend[0].by_store["Koramangala"], dec("200"));
    assert_eq!(trend[1].by_store.len(), 1);
}

#[test]
fn top_sellers_lead_the_product_report() {
    let rows = vec![
        ProductLineRow {
            product_name: "Rusk".into(),
            quantity: dec("2"),
            line_total: dec("40"),
            cost_price: dec("5"),
        },
        ProductLineRow {
            product_name: "Plum Cake".into(),
            quantity: dec("1"),
            line_total: dec("600"),
            cost_price: dec("200"),
        },
    ];

    // The dashboard takes the first N entries as its top sellers, so
    // the reducer must order by revenue descending
    let report = group_lines_by_product(&rows);
    assert_eq!(report[0].product_name, "Plum Cake");
    assert_eq!(report[1].product_name, "Rusk");
}

// ============================================================================
// Default report range
// ============================================================================

#[test]
fn default_report_window_is_thirty_days_inclusive() {
    let range = DateRange::last_days(day("2024-03-30"), 30);
    assert_eq!(range.start, day("2024-03-01"));
    assert_eq!(range.end, day("2024-03-30"));
    // 30 calendar days counting both endpoints
    assert_eq!((range.end - range.start).num_days(), 29);
}

#[test]
fn one_day_window_starts_and_ends_on_the_same_day() {
    let range = DateRange::last_days(day("2024-03-30"), 1);
    assert_eq!(range.start, range.end);
}

// ============================================================================
// Stock boundaries
// ============================================================================

#[test]
fn low_stock_boundary_is_inclusive() {
    assert_eq!(stock_status(dec("5"), dec("5")), StockStatus::Low);
    assert_eq!(stock_status(dec("5.001"), dec("5")), StockStatus::Ok);
    assert!(is_low_stock(dec("5"), dec("5")));
    assert!(!is_low_stock(dec("5.001"), dec("5")));
}

// ============================================================================
// CSV export
// ============================================================================

#[test]
fn csv_quotes_fields_with_commas_and_quotes() {
    let rows = vec![
        shared::reports::ProductPerformance {
            product_name: "Bun, Cream".into(),
            quantity_sold: dec("3"),
            revenue: dec("120"),
            cost: dec("45"),
            profit: dec("75"),
        },
        shared::reports::ProductPerformance {
            product_name: "\"Special\" Cake".into(),
            quantity_sold: dec("1"),
            revenue: dec("350"),
            cost: dec("120"),
            profit: dec("230"),
        },
    ];

    let csv = export::product_performance_csv(&rows).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "\"Bun, Cream\",3,120,45,75");
    assert_eq!(lines[2], "\"\"\"Special\"\" Cake\",1,350,120,230");
}

#[test]
fn stock_report_csv_carries_value_and_status() {
    let uuid = uuid::Uuid::nil();
    let rows = vec![StockReportItem {
        product_id: uuid,
        product_name: "Flour, Maida".into(),
        unit: "kg".into(),
        current_stock: dec("12.5"),
        weighted_avg_cost: dec("40"),
        stock_value: dec("500"),
        reorder_level: dec("20"),
        status: Some(StockStatus::Low),
    }];

    let csv = export::stock_report_csv(&rows).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "product,unit,current_stock,weighted_avg_cost,stock_value,reorder_level,status"
    );
    assert_eq!(lines[1], "\"Flour, Maida\",kg,12.5,40,500,20,low");
}

#[test]
fn csv_roundtrips_through_a_reader() {
    let rows = vec![shared::reports::ProductPerformance {
        product_name: "Bun, Cream".into(),
        quantity_sold: dec("3"),
        revenue: dec("120"),
        cost: dec("45"),
        profit: dec("75"),
    }];

    let csv = export::product_performance_csv(&rows).unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "Bun, Cream");
}
