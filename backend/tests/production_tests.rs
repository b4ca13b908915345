//! Production and expiration tests

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::production::{batch_number_for, expiry_status, production_cost};
use shared::types::ExpiryStatus;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

// ============================================================================
// Batch numbers
// ============================================================================

#[test]
fn batch_numbers_are_timestamps() {
    assert_eq!(batch_number_for(at(2024, 3, 7, 14, 5, 9)), "BATCH20240307140509");
    // Single-digit fields are zero padded
    assert_eq!(batch_number_for(at(2024, 1, 1, 0, 0, 0)), "BATCH20240101000000");
}

#[test]
fn batch_numbers_order_like_their_timestamps() {
    let earlier = batch_number_for(at(2024, 3, 7, 9, 0, 0));
    let later = batch_number_for(at(2024, 3, 7, 17, 30, 0));
    assert!(earlier < later);
}

// ============================================================================
// Expiry classification
// ============================================================================

#[test]
fn expiry_boundaries() {
    assert_eq!(expiry_status(-5), ExpiryStatus::Expired);
    assert_eq!(expiry_status(-1), ExpiryStatus::Expired);
    assert_eq!(expiry_status(0), ExpiryStatus::Critical);
    assert_eq!(expiry_status(1), ExpiryStatus::Critical);
    assert_eq!(expiry_status(2), ExpiryStatus::Warning);
    assert_eq!(expiry_status(3), ExpiryStatus::Warning);
    assert_eq!(expiry_status(4), ExpiryStatus::Good);
    assert_eq!(expiry_status(365), ExpiryStatus::Good);
}

proptest! {
    /// Classification is monotonic: more days left never makes a batch
    /// more urgent
    #[test]
    fn expiry_status_is_monotonic(days in -30i64..30) {
        fn rank(s: ExpiryStatus) -> u8 {
            match s {
                ExpiryStatus::Expired => 0,
                ExpiryStatus::Critical => 1,
                ExpiryStatus::Warning => 2,
                ExpiryStatus::Good => 3,
            }
        }
        prop_assert!(rank(expiry_status(days)) <= rank(expiry_status(days + 1)));
    }
}

// ============================================================================
// Production cost
// ============================================================================

#[test]
fn run_cost_scales_with_quantity() {
    let per_unit = dec("12.50");
    assert_eq!(production_cost(per_unit, dec("40")), dec("500.00"));
    assert_eq!(production_cost(per_unit, dec("0")), Decimal::ZERO);
}

#[test]
fn run_cost_handles_fractional_quantities() {
    // 2.5 kg at 80/kg
    assert_eq!(production_cost(dec("80"), dec("2.5")), dec("200.0"));
}
