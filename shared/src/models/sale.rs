//! Sale models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentMode;

/// Sale header. `bill_number` is globally unique and human-readable,
/// generated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub bill_number: String,
    pub store_id: Uuid,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_mode: PaymentMode,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// One product line of a sale. `cost_price` snapshots the product's weighted
/// average cost at sale time so profit reports survive later cost changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    /// Name at sale time, kept so receipts survive product renames
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
    pub cost_price: Decimal,
    pub created_at: DateTime<Utc>,
}
