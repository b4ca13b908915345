//! Checkout tests
//!
//! Covers the cart math the checkout endpoint relies on and the error
//! classification that drives the bill-number retry loop.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use bakepos_backend::services::sale::{is_unique_violation_on, CheckoutResponse};
use shared::models::cart::{Cart, CartProduct};
use shared::models::sale::SaleLine;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(name: &str, price: &str) -> CartProduct {
    CartProduct {
        product_id: uuid::Uuid::new_v4(),
        name: name.to_string(),
        selling_price: dec(price),
        unit: "pcs".to_string(),
    }
}

// ============================================================================
// Retry classification
// ============================================================================

#[test]
fn retries_only_on_bill_number_unique_violation() {
    // The exact race the retry loop exists for
    assert!(is_unique_violation_on(
        Some("23505"),
        Some("sales_bill_number_key"),
        "sales_bill_number"
    ));

    // Unique violation on a different constraint: not a bill race
    assert!(!is_unique_violation_on(
        Some("23505"),
        Some("products_sku_key"),
        "sales_bill_number"
    ));

    // Same constraint, different error class: foreign key, check, etc.
    assert!(!is_unique_violation_on(
        Some("23503"),
        Some("sales_bill_number_key"),
        "sales_bill_number"
    ));
    assert!(!is_unique_violation_on(
        Some("23514"),
        Some("sales_bill_number_key"),
        "sales_bill_number"
    ));

    // Missing metadata never retries
    assert!(!is_unique_violation_on(None, Some("sales_bill_number_key"), "sales_bill_number"));
    assert!(!is_unique_violation_on(Some("23505"), None, "sales_bill_number"));
}

// ============================================================================
// Cart invariants
// ============================================================================

#[test]
fn empty_cart_totals_are_zero() {
    let cart = Cart::new();
    assert_eq!(cart.subtotal(), Decimal::ZERO);
    assert_eq!(cart.discount_total(), Decimal::ZERO);
    assert_eq!(cart.total(), Decimal::ZERO);
}

#[test]
fn full_discount_brings_total_to_zero() {
    let mut cart = Cart::new();
    let cake = product("Plum Cake", "350.00");
    let id = cake.product_id;
    cart.add_item(cake);
    cart.update_discount(id, dec("100"));

    assert_eq!(cart.subtotal(), dec("350.00"));
    assert_eq!(cart.discount_total(), dec("350.00"));
    assert_eq!(cart.total(), Decimal::ZERO);
}

proptest! {
    /// total = subtotal - discount_total for any cart contents
    #[test]
    fn totals_identity_holds(
        prices in proptest::collection::vec(1u32..100_000, 1..8),
        quantities in proptest::collection::vec(1u32..50, 1..8),
        discounts in proptest::collection::vec(0u32..=100, 1..8),
    ) {
        let mut cart = Cart::new();
        let n = prices.len().min(quantities.len()).min(discounts.len());
        for i in 0..n {
            let p = CartProduct {
                product_id: uuid::Uuid::new_v4(),
                name: format!("item-{i}"),
                selling_price: Decimal::from(prices[i]) / Decimal::from(100),
                unit: "pcs".to_string(),
            };
            let id = p.product_id;
            cart.add_item(p);
            cart.update_quantity(id, quantities[i]);
            cart.update_discount(id, Decimal::from(discounts[i]));
        }

        prop_assert_eq!(cart.total(), cart.subtotal() - cart.discount_total());
        prop_assert!(cart.total() >= Decimal::ZERO);
        prop_assert!(cart.discount_total() <= cart.subtotal());
    }

    /// Line totals never exceed the undiscounted gross
    #[test]
    fn discounts_never_increase_a_line(
        price in 1u32..100_000,
        qty in 1u32..50,
        discount in 0u32..=100,
    ) {
        let mut cart = Cart::new();
        let p = CartProduct {
            product_id: uuid::Uuid::new_v4(),
            name: "item".to_string(),
            selling_price: Decimal::from(price) / Decimal::from(100),
            unit: "pcs".to_string(),
        };
        let id = p.product_id;
        cart.add_item(p);
        cart.update_quantity(id, qty);
        cart.update_discount(id, Decimal::from(discount));

        let item = &cart.items()[0];
        prop_assert!(item.line_total() <= item.gross());
        prop_assert!(item.line_total() >= Decimal::ZERO);
    }
}

// ============================================================================
// Checkout response
// ============================================================================

#[test]
fn checkout_response_carries_the_persisted_lines() {
    let sale_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();
    let response = CheckoutResponse {
        sale_id,
        bill_number: "MG1-20240307-0001".to_string(),
        subtotal: dec("120"),
        discount_amount: dec("12"),
        total_amount: dec("108"),
        sale_date: now,
        lines: vec![SaleLine {
            id: uuid::Uuid::new_v4(),
            sale_id,
            product_id: uuid::Uuid::new_v4(),
            product_name: "Plum Cake".to_string(),
            quantity: dec("2"),
            unit_price: dec("60"),
            discount_percent: dec("10"),
            line_total: dec("108"),
            cost_price: dec("35"),
            created_at: now,
        }],
    };

    // The receipt prints straight from this payload, so the lines must
    // ride along with the header instead of needing a second fetch.
    let json = serde_json::to_value(&response).unwrap();
    let lines = json["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["product_name"], "Plum Cake");
    assert_eq!(lines[0]["line_total"], "108");
    assert_eq!(json["bill_number"], "MG1-20240307-0001");
}
