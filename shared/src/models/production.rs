//! Production and batch-expiration models

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ExpiryStatus;

/// A finished-goods batch created by a production run. Batches transition
/// active -> depleted as they are consumed FIFO, or active -> expired via
/// the wastage flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedGoodsBatch {
    pub id: Uuid,
    pub batch_number: String,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub production_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub quantity_produced: Decimal,
    pub quantity_remaining: Decimal,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a finished-goods batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    Depleted,
    Expired,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Depleted => "depleted",
            BatchStatus::Expired => "expired",
        }
    }
}

/// Batch numbers are timestamp strings: BATCH + yyyyMMddHHmmss
pub fn batch_number_for(at: NaiveDateTime) -> String {
    format!("BATCH{}", at.format("%Y%m%d%H%M%S"))
}

/// Classify a batch by days until expiry. Negative means already expired;
/// one day or less is critical, three or less a warning.
pub fn expiry_status(days_until_expiry: i64) -> ExpiryStatus {
    if days_until_expiry < 0 {
        ExpiryStatus::Expired
    } else if days_until_expiry <= 1 {
        ExpiryStatus::Critical
    } else if days_until_expiry <= 3 {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Good
    }
}

/// Production cost for a run: per-unit recipe cost times quantity produced
pub fn production_cost(cost_per_unit: Decimal, quantity_produced: Decimal) -> Decimal {
    cost_per_unit * quantity_produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn batch_number_encodes_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(batch_number_for(at), "BATCH20240307140509");
    }

    #[test]
    fn expiry_status_boundaries() {
        assert_eq!(expiry_status(-1), ExpiryStatus::Expired);
        assert_eq!(expiry_status(0), ExpiryStatus::Critical);
        assert_eq!(expiry_status(1), ExpiryStatus::Critical);
        assert_eq!(expiry_status(2), ExpiryStatus::Warning);
        assert_eq!(expiry_status(3), ExpiryStatus::Warning);
        assert_eq!(expiry_status(4), ExpiryStatus::Good);
    }
}
