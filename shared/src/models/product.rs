//! Product and inventory models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::StockStatus;

/// A sellable or purchasable item. Raw materials and finished goods share the
/// same table; the two flags are not mutually exclusive (e.g. tea leaves sold
/// loose and used in recipes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub unit: String,
    pub selling_price: Decimal,
    pub current_stock: Decimal,
    /// Running average unit cost, maintained by purchase/production triggers
    pub weighted_avg_cost: Decimal,
    pub reorder_level: Decimal,
    pub is_raw_material: bool,
    pub is_finished_good: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// Per-store stock row, keyed by (store, product)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInventory {
    pub id: Uuid,
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub current_stock: Decimal,
    pub reorder_level: Decimal,
}

/// Classify stock against the reorder level. The boundary is inclusive:
/// stock equal to the reorder level counts as low.
pub fn stock_status(current_stock: Decimal, reorder_level: Decimal) -> StockStatus {
    if current_stock <= Decimal::ZERO {
        StockStatus::Out
    } else if current_stock <= reorder_level {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Low-stock test used by dashboards and reorder listings
pub fn is_low_stock(current_stock: Decimal, reorder_level: Decimal) -> bool {
    current_stock <= reorder_level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_equal_to_reorder_level_is_low() {
        assert_eq!(
            stock_status(Decimal::from(5), Decimal::from(5)),
            StockStatus::Low
        );
        assert!(is_low_stock(Decimal::from(5), Decimal::from(5)));
    }

    #[test]
    fn zero_stock_is_out() {
        assert_eq!(
            stock_status(Decimal::ZERO, Decimal::from(5)),
            StockStatus::Out
        );
    }

    #[test]
    fn stock_above_reorder_level_is_ok() {
        assert_eq!(
            stock_status(Decimal::from(6), Decimal::from(5)),
            StockStatus::Ok
        );
    }
}
