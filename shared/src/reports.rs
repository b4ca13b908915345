//! Pure report reducers
//!
//! The report screens work on flat rows fetched for a date range and reduce
//! them into grouped summaries. Keeping the reducers here (no I/O) lets the
//! backend and the browser (via WASM) share them, and makes them trivially
//! testable.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat sale row used by the daily grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleAmountRow {
    pub sale_date: NaiveDate,
    pub total_amount: Decimal,
}

/// One day of the daily sales report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub avg_order_value: Decimal,
}

/// Group sales by calendar date. Output is ascending by date; the average
/// order value is total / orders for that day.
pub fn group_sales_by_day(rows: &[SaleAmountRow]) -> Vec<DailySales> {
    let mut grouped: BTreeMap<NaiveDate, (Decimal, i64)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(row.sale_date).or_insert((Decimal::ZERO, 0));
        entry.0 += row.total_amount;
        entry.1 += 1;
    }
    grouped
        .into_iter()
        .map(|(date, (total, orders))| DailySales {
            date,
            total_sales: total,
            total_orders: orders,
            avg_order_value: total / Decimal::from(orders),
        })
        .collect()
}

/// Flat sale-line row used by the product grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLineRow {
    pub product_name: String,
    pub quantity: Decimal,
    pub line_total: Decimal,
    pub cost_price: Decimal,
}

/// One product of the performance report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPerformance {
    pub product_name: String,
    pub quantity_sold: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// Group sale lines by product name, sorted by revenue descending. Cost is
/// the per-line cost snapshot times quantity.
pub fn group_lines_by_product(rows: &[ProductLineRow]) -> Vec<ProductPerformance> {
    let mut grouped: BTreeMap<&str, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let entry = grouped
            .entry(row.product_name.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        entry.0 += row.quantity;
        entry.1 += row.line_total;
        entry.2 += row.cost_price * row.quantity;
    }
    let mut report: Vec<ProductPerformance> = grouped
        .into_iter()
        .map(|(name, (qty, revenue, cost))| ProductPerformance {
            product_name: name.to_string(),
            quantity_sold: qty,
            revenue,
            cost,
            profit: revenue - cost,
        })
        .collect();
    report.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    report
}

/// Flat per-store daily total used by the trend pivot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDayRow {
    pub store_name: String,
    pub date: NaiveDate,
    pub total_sales: Decimal,
}

/// One point of the multi-store sales trend: one calendar date with a total
/// per store name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub by_store: BTreeMap<String, Decimal>,
}

/// Pivot per-store daily totals into one row per date, ascending by date
pub fn pivot_sales_trend(rows: &[StoreDayRow]) -> Vec<TrendPoint> {
    let mut grouped: BTreeMap<NaiveDate, BTreeMap<String, Decimal>> = BTreeMap::new();
    for row in rows {
        let day = grouped.entry(row.date).or_default();
        *day.entry(row.store_name.clone()).or_insert(Decimal::ZERO) += row.total_sales;
    }
    grouped
        .into_iter()
        .map(|(date, by_store)| TrendPoint { date, by_store })
        .collect()
}

/// Count distinct customers for the dashboard: sales carrying a phone or a
/// name are deduplicated (phone preferred as the identifier); every walk-in
/// sale counts as its own customer.
pub fn count_customers<'a, I>(sales: I) -> usize
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut identified = std::collections::BTreeSet::new();
    let mut walk_ins = 0usize;
    for (name, phone) in sales {
        match phone.or(name) {
            Some(id) if !id.is_empty() => {
                identified.insert(id.to_string());
            }
            _ => walk_ins += 1,
        }
    }
    identified.len() + walk_ins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    #[test]
    fn groups_sales_by_date() {
        let rows = vec![
            SaleAmountRow {
                sale_date: day("2024-01-01"),
                total_amount: dec("10"),
            },
            SaleAmountRow {
                sale_date: day("2024-01-01"),
                total_amount: dec("5"),
            },
            SaleAmountRow {
                sale_date: day("2024-01-02"),
                total_amount: dec("7"),
            },
        ];
        let report = group_sales_by_day(&rows);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].date, day("2024-01-01"));
        assert_eq!(report[0].total_sales, dec("15"));
        assert_eq!(report[0].total_orders, 2);
        assert_eq!(report[1].date, day("2024-01-02"));
        assert_eq!(report[1].total_sales, dec("7"));
        assert_eq!(report[1].total_orders, 1);
    }

    #[test]
    fn product_grouping_sorts_by_revenue() {
        let rows = vec![
            ProductLineRow {
                product_name: "Rusk".into(),
                quantity: dec("2"),
                line_total: dec("30"),
                cost_price: dec("5"),
            },
            ProductLineRow {
                product_name: "Plum Cake".into(),
                quantity: dec("1"),
                line_total: dec("350"),
                cost_price: dec("120"),
            },
            ProductLineRow {
                product_name: "Rusk".into(),
                quantity: dec("4"),
                line_total: dec("60"),
                cost_price: dec("5"),
            },
        ];
        let report = group_lines_by_product(&rows);
        assert_eq!(report[0].product_name, "Plum Cake");
        assert_eq!(report[1].product_name, "Rusk");
        assert_eq!(report[1].quantity_sold, dec("6"));
        assert_eq!(report[1].revenue, dec("90"));
        assert_eq!(report[1].cost, dec("30"));
        assert_eq!(report[1].profit, dec("60"));
    }

    #[test]
    fn walk_ins_each_count_as_a_customer() {
        let sales = vec![
            (Some("Asha"), Some("9876500000")),
            (None, Some("9876500000")),
            (Some("Asha"), None),
            (None, None),
            (None, None),
        ];
        // phone 9876500000 twice -> 1, name Asha -> 1, two walk-ins -> 2
        assert_eq!(count_customers(sales), 4);
    }
}
